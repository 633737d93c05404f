//! Crop, aggregate and scene tests on realistic geometries.

use geo_common::{GeoError, GeoGrid, Geometry, Raster};
use grid_processor::{
    ops::grid_window, RasterOps, Reducer, ResampleConfig, ResampleMethod, ResamplingEngine,
    Scene, TargetGeometry,
};
use projection::Projection;
use test_utils::{
    assert_approx_eq, create_swath, create_swath_raster, create_test_raster, fixtures::bbox,
    fixtures::grids, init_test_tracing, TEST_FILL,
};

fn ops() -> RasterOps {
    init_test_tracing();
    RasterOps::new(ResampleConfig::default())
}

// =============================================================================
// Crop
// =============================================================================

#[test]
fn test_crop_hrrr_to_small_box() {
    let hrrr = grids::hrrr_conus();
    let source = create_test_raster(&hrrr);

    let out = ops().crop(&source, &bbox::SMALL).unwrap();
    let grid = out.geometry().as_grid().unwrap();
    let (rows, cols) = grid.shape();
    assert!((35..=45).contains(&rows), "rows = {}", rows);
    assert!((27..=40).contains(&cols), "cols = {}", cols);
    assert!(grid.same_projection(&hrrr));
    assert_approx_eq!(grid.pixel_size_x(), hrrr.pixel_size_x(), 1e-6);

    // Values are sliced, not resampled
    let (row_range, col_range) = grid_window(&hrrr, &bbox::SMALL, 20).unwrap();
    assert_eq!(
        out.get(0, 0, 0),
        source.get(0, row_range.start, col_range.start)
    );

    // Every kept pixel centre lies close to the box
    let proj = Projection::from_descriptor(grid.projection()).unwrap();
    for (r, c) in [(0, 0), (0, cols - 1), (rows - 1, 0), (rows - 1, cols - 1)] {
        let (x, y) = grid.pixel_center(r, c);
        let (lon, lat) = proj.unproject(x, y).unwrap();
        assert!((-100.2..=-98.8).contains(&lon), "lon = {}", lon);
        assert!((37.9..=39.1).contains(&lat), "lat = {}", lat);
    }
}

#[test]
fn test_crop_global_grid_to_europe() {
    let global = grids::global_quarter_degree();
    let source = create_test_raster(&global);

    let out = ops().crop(&source, &bbox::EUROPE).unwrap();
    // 60 x 37 degrees of quarter-degree pixels
    assert_eq!(out.shape(), (148, 240));
    let extent = out.geometry().as_grid().unwrap().extent();
    assert_approx_eq!(extent.min_x, -15.0, 1e-9);
    assert_approx_eq!(extent.max_y, 72.0, 1e-9);
}

#[test]
fn test_crop_rejects_invalid_and_disjoint_boxes() {
    let ops = ops();
    let source = create_test_raster(&grids::simple_10x10());
    assert!(matches!(
        ops.crop(&source, &bbox::INVALID),
        Err(GeoError::InvalidGeometry(_))
    ));
    assert!(matches!(
        ops.crop(&source, &bbox::SMALL),
        Err(GeoError::BBoxOutsideData(_))
    ));
}

#[test]
fn test_crop_swath_keeps_geolocation() {
    let swath = create_swath(30, 30, -99.5, 38.5, 0.05, 1);
    let source = create_swath_raster(&swath);

    let out = ops().crop(&source, &bbox::SMALL).unwrap();
    assert_eq!(out.geometry(), source.geometry());
    let kept = out.valid_count();
    assert!(kept > 300 && kept < 900, "kept = {}", kept);

    for (i, &value) in out.values().iter().enumerate() {
        let (lon, lat) = (swath.longitudes()[i], swath.latitudes()[i]);
        let inside = bbox::SMALL.contains_point(lon, lat);
        assert_eq!(value != TEST_FILL, inside, "pixel {} at ({}, {})", i, lon, lat);
    }
}

// =============================================================================
// Aggregate
// =============================================================================

#[test]
fn test_aggregate_hrrr_by_three() {
    let hrrr = grids::hrrr_conus();
    let source = create_test_raster(&hrrr);

    let out = ops().aggregate(&source, 3, 3, &Reducer::Mean).unwrap();
    let grid = out.geometry().as_grid().unwrap();
    assert_eq!(grid.shape(), (353, 600));
    assert_approx_eq!(grid.pixel_size_x(), 9000.0, 1e-6);
    // 1799 columns do not divide by 3: the grid grows east by one pixel
    assert_approx_eq!(grid.extent().max_x, hrrr.extent().max_x + 3000.0, 1e-6);

    // Values encode col * 1000 + row; the mean of the first block is its centre
    assert_eq!(out.get(0, 0, 0), Some(1001.0));
}

#[test]
fn test_aggregate_skips_fill() {
    let grid = grids::lonlat_degree_grid(0.0, 2.0, 2, 2);
    let source = Raster::new(vec![1.0f32, TEST_FILL, 3.0, TEST_FILL], grid, TEST_FILL).unwrap();
    let ops = ops();

    let mean = ops.aggregate(&source, 2, 2, &Reducer::Mean).unwrap();
    assert_eq!(mean.values(), &[2.0]);
    let sum = ops.aggregate(&source, 2, 2, &Reducer::Sum).unwrap();
    assert_eq!(sum.values(), &[4.0]);
    let product = ops.aggregate(&source, 2, 2, &Reducer::custom(|a, b| a * b)).unwrap();
    assert_eq!(product.values(), &[3.0]);

    let all_fill = Raster::new(vec![TEST_FILL; 4], grids::lonlat_degree_grid(0.0, 2.0, 2, 2), TEST_FILL).unwrap();
    let out = ops.aggregate(&all_fill, 2, 2, &Reducer::Max).unwrap();
    assert_eq!(out.values(), &[TEST_FILL]);
}

#[test]
fn test_aggregate_swath() {
    let swath = create_swath(4, 6, 120.0, -10.0, 0.01, 5);
    let source = create_swath_raster(&swath);

    let out = ops().aggregate(&source, 2, 3, &Reducer::Min).unwrap();
    assert_eq!(out.shape(), (2, 2));
    let Geometry::Swath(coarse) = out.geometry() else {
        panic!("aggregated swath should stay a swath");
    };
    let (lon, lat) = coarse.lonlat(0, 0);
    assert_approx_eq!(lon, 120.0 - 0.015, 0.002);
    assert_approx_eq!(lat, -10.0 + 0.01, 0.002);
}

// =============================================================================
// Scene
// =============================================================================

fn conus_scene() -> Scene<f32> {
    let fine = grids::lonlat_degree_grid(-110.0, 45.0, 10, 20);
    let coarse = GeoGrid::from_origin(
        test_utils::fixtures::projections::lonlat(),
        -110.0,
        45.0,
        2.0,
        2.0,
        5,
        10,
    )
    .unwrap();
    let mut scene = Scene::new();
    scene.insert("vis", create_test_raster(&fine));
    scene.insert("ir", create_test_raster(&coarse));
    scene
}

#[test]
fn test_scene_resample_to_coarsest() {
    let scene = conus_scene();
    let engine = ResamplingEngine::default();
    let coarsest = scene.coarsest_grid().unwrap();

    let out = scene
        .resample(&engine, &TargetGeometry::Grid(coarsest.clone()), ResampleMethod::Native)
        .unwrap();
    assert_eq!(out.get("ir").unwrap(), scene.get("ir").unwrap());
    let vis = out.get("vis").unwrap();
    assert_eq!(vis.geometry().as_grid(), Some(&coarsest));
    // Mean of rows 0..2 and cols 0..2 of col * 1000 + row
    assert_eq!(vis.get(0, 0, 0), Some(500.5));
}

#[test]
fn test_scene_crop_and_aggregate() {
    let scene = conus_scene();
    let ops = ops();

    let cropped = scene.crop(&ops, &bbox::SMALL).unwrap();
    assert_eq!(cropped.get("vis").unwrap().values(), &[10006.0]);
    assert_eq!(cropped.get("ir").unwrap().values(), &[5003.0]);
    assert!(matches!(
        scene.crop(&ops, &bbox::EUROPE),
        Err(GeoError::BBoxOutsideData(_))
    ));

    let aggregated = scene.aggregate(&ops, 5, 10, &Reducer::Max).unwrap();
    assert_eq!(aggregated.get("vis").unwrap().shape(), (2, 2));
    assert_eq!(aggregated.get("ir").unwrap().shape(), (1, 1));
    assert_eq!(aggregated.get("ir").unwrap().values(), &[9004.0]);
}

#[test]
fn test_scene_dynamic_target_covers_all() {
    let scene = conus_scene();
    // Wide enough to reach the centres of the two-degree "ir" pixels
    let engine = ResamplingEngine::new(ResampleConfig {
        radius_of_influence: 150_000.0,
        ..Default::default()
    })
    .unwrap();
    let target = TargetGeometry::Dynamic {
        projection: test_utils::fixtures::projections::lonlat(),
        pixel_size_x: 0.5,
        pixel_size_y: 0.5,
    };

    let out = scene.resample(&engine, &target, ResampleMethod::Nearest).unwrap();
    for (_, raster) in out.iter() {
        assert_eq!(raster.shape(), (20, 40));
        assert_eq!(raster.valid_count(), 20 * 40);
    }
}
