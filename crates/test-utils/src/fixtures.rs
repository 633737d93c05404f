//! Common test fixtures for resampling tests.
//!
//! This module provides pre-defined projections, grids and areas that
//! represent the geometries satellite products commonly arrive on.

/// Common bounding box definitions for testing (lon/lat degrees).
pub mod bbox {
    use geo_common::BoundingBox;

    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    /// Continental United States bounding box
    pub const CONUS: BoundingBox = BoundingBox {
        min_x: -130.0,
        min_y: 20.0,
        max_x: -60.0,
        max_y: 55.0,
    };

    /// Europe bounding box
    pub const EUROPE: BoundingBox = BoundingBox {
        min_x: -15.0,
        min_y: 35.0,
        max_x: 45.0,
        max_y: 72.0,
    };

    /// A one-degree box over Kansas
    pub const SMALL: BoundingBox = BoundingBox {
        min_x: -100.0,
        min_y: 38.0,
        max_x: -99.0,
        max_y: 39.0,
    };

    /// Invalid bbox (min > max)
    pub const INVALID: BoundingBox = BoundingBox {
        min_x: 10.0,
        min_y: 10.0,
        max_x: 5.0,
        max_y: 5.0,
    };
}

/// Common projections for testing.
pub mod projections {
    use geo_common::{ProjectionDescriptor, ProjectionFamily};

    pub fn lonlat() -> ProjectionDescriptor {
        ProjectionDescriptor::lonlat()
    }

    pub fn goes_east() -> ProjectionDescriptor {
        ProjectionDescriptor::goes_east()
    }

    pub fn meteosat() -> ProjectionDescriptor {
        ProjectionDescriptor::meteosat_0deg()
    }

    pub fn hrrr_lcc() -> ProjectionDescriptor {
        ProjectionDescriptor::hrrr_lcc()
    }

    pub fn web_mercator() -> ProjectionDescriptor {
        ProjectionDescriptor::web_mercator()
    }

    /// Northern polar stereographic, true scale at 60°N.
    pub fn north_stere() -> ProjectionDescriptor {
        ProjectionDescriptor::new(ProjectionFamily::PolarStereographic)
            .with_param("lat_0", 90.0)
            .with_param("lat_ts", 60.0)
            .with_param("lon_0", 14.0)
    }

    /// Secant Lambert conic over Europe.
    pub fn euro_lcc() -> ProjectionDescriptor {
        ProjectionDescriptor::new(ProjectionFamily::LambertConformalConic)
            .with_param("lat_1", 35.0)
            .with_param("lat_2", 65.0)
            .with_param("lat_0", 52.0)
            .with_param("lon_0", 10.0)
    }

    /// Every family, for round-trip sweeps.
    pub fn all() -> Vec<ProjectionDescriptor> {
        vec![
            lonlat(),
            goes_east(),
            meteosat(),
            hrrr_lcc(),
            web_mercator(),
            north_stere(),
            euro_lcc(),
        ]
    }
}

/// Common grids for testing.
pub mod grids {
    use geo_common::{BoundingBox, GeoGrid};

    use super::projections;

    fn build(
        projection: geo_common::ProjectionDescriptor,
        extent: BoundingBox,
        rows: usize,
        cols: usize,
    ) -> GeoGrid {
        GeoGrid::new(projection, extent, rows, cols).expect("fixture grid is valid")
    }

    /// Global 0.25 degree lon/lat grid
    pub fn global_quarter_degree() -> GeoGrid {
        build(
            projections::lonlat(),
            BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            720,
            1440,
        )
    }

    /// HRRR CONUS grid (3km resolution, 1799x1059)
    pub fn hrrr_conus() -> GeoGrid {
        build(
            projections::hrrr_lcc(),
            BoundingBox::new(-2699020.14, -1588806.15, 2697979.86, 1588193.85),
            1059,
            1799,
        )
    }

    /// GOES-East full disk at 2km nadir resolution
    pub fn goes_east_full_disk() -> GeoGrid {
        build(
            projections::goes_east(),
            BoundingBox::new(-5434894.67, -5434894.67, 5434894.67, 5434894.67),
            5424,
            5424,
        )
    }

    /// Simple 10x10 lon/lat grid spanning -10..10 degrees
    pub fn simple_10x10() -> GeoGrid {
        build(
            projections::lonlat(),
            BoundingBox::new(-10.0, -10.0, 10.0, 10.0),
            10,
            10,
        )
    }

    /// Small lon/lat grid with one-degree pixels, north-west corner at
    /// `(west, north)`.
    pub fn lonlat_degree_grid(west: f64, north: f64, rows: usize, cols: usize) -> GeoGrid {
        GeoGrid::from_origin(projections::lonlat(), west, north, 1.0, 1.0, rows, cols)
            .expect("fixture grid is valid")
    }
}

/// Area definitions document matching the fixture grids.
pub const AREAS_YAML: &str = r#"
global_quarter:
  description: Global 0.25 degree lat/lon
  projection:
    proj: latlong
  shape: {height: 720, width: 1440}
  area_extent:
    lower_left_xy: [-180.0, -90.0]
    upper_right_xy: [180.0, 90.0]
hrrr_conus:
  description: HRRR CONUS 3 km
  projection:
    proj: lcc
    lat_1: 38.5
    lat_0: 38.5
    lon_0: -97.5
    R: 6371229
  shape: {height: 1059, width: 1799}
  area_extent:
    lower_left_xy: [-2699020.14, -1588806.15]
    upper_right_xy: [2697979.86, 1588193.85]
goes_east_fd:
  description: GOES-East full disk 2 km
  projection:
    proj: geos
    h: 35786023
    lon_0: -75.2
    a: 6378137
    b: 6356752.31414
    sweep_x: 1
  shape: {height: 5424, width: 5424}
  area_extent:
    lower_left_xy: [-5434894.67, -5434894.67]
    upper_right_xy: [5434894.67, 5434894.67]
"#;
