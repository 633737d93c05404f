//! Cropping by a geographic bounding box.

use geo_common::{BoundingBox, GeoError, GeoGrid, GeoResult, Raster, RasterValue, SwathGeometry};
use projection::Projection;
use std::ops::Range;

use crate::resample::clean;

/// Fraction of a pixel by which a centre may sit outside the box and still
/// count as inside.
const CENTRE_EPSILON: f64 = 1e-9;

/// Reject boxes that are not finite or have `min >= max`.
pub(crate) fn validate_bbox(bbox: &BoundingBox) -> GeoResult<()> {
    if !bbox.is_valid() {
        return Err(GeoError::invalid_geometry(format!(
            "crop bbox {:?} must be finite with min < max",
            bbox.as_array()
        )));
    }
    Ok(())
}

/// Row and column ranges of the grid pixels whose centres fall inside the
/// bbox once its outline is projected into the grid's projection.
pub fn grid_window(
    grid: &GeoGrid,
    bbox: &BoundingBox,
    edge_samples: usize,
) -> GeoResult<(Range<usize>, Range<usize>)> {
    let proj = Projection::from_descriptor(grid.projection())?;
    let mut projected = BoundingBox::empty();
    for (lon, lat) in bbox.outline(edge_samples) {
        if let Some((x, y)) = proj.project(lon, lat) {
            projected.include(x, y);
        }
    }
    if projected.is_empty() {
        return Err(GeoError::BBoxOutsideData(bbox.as_array()));
    }

    let extent = grid.extent();
    let psx = grid.pixel_size_x();
    let psy = grid.pixel_size_y();

    let cols = centre_range(
        (projected.min_x - extent.min_x) / psx,
        (projected.max_x - extent.min_x) / psx,
        grid.n_cols(),
    );
    let rows = centre_range(
        (extent.max_y - projected.max_y) / psy,
        (extent.max_y - projected.min_y) / psy,
        grid.n_rows(),
    );
    if rows.is_empty() || cols.is_empty() {
        return Err(GeoError::BBoxOutsideData(bbox.as_array()));
    }
    Ok((rows, cols))
}

/// Indices `i < n` with `lo <= i + 0.5 <= hi`, in pixel units.
fn centre_range(lo: f64, hi: f64, n: usize) -> Range<usize> {
    let start = (lo - 0.5 - CENTRE_EPSILON).ceil().max(0.0);
    let end = ((hi - 0.5 + CENTRE_EPSILON).floor() + 1.0).clamp(0.0, n as f64);
    let start = start.min(n as f64) as usize;
    let end = end as usize;
    start..end.max(start)
}

pub(crate) fn crop_grid<T: RasterValue>(
    source: &Raster<T>,
    grid: &GeoGrid,
    bbox: &BoundingBox,
    edge_samples: usize,
) -> GeoResult<Raster<T>> {
    let (rows, cols) = grid_window(grid, bbox, edge_samples)?;
    let sub_grid = grid.slice(rows.start, rows.end, cols.start, cols.end)?;

    let n_cols = grid.n_cols();
    let fill = source.fill_value();
    let mut values = Vec::with_capacity(source.bands() * sub_grid.len());
    for plane in source.band_planes() {
        for r in rows.clone() {
            values.extend(
                plane[r * n_cols + cols.start..r * n_cols + cols.end]
                    .iter()
                    .map(|&v| clean(v, fill)),
            );
        }
    }

    tracing::debug!(
        rows = ?rows,
        cols = ?cols,
        "Cropped grid"
    );
    Raster::with_bands(values, source.bands(), sub_grid, fill)
}

/// Whether a lon/lat lies in the bbox, also trying the longitude shifted by
/// a full turn.
fn lonlat_inside(bbox: &BoundingBox, lon: f64, lat: f64) -> bool {
    [lon, lon - 360.0, lon + 360.0]
        .into_iter()
        .any(|l| bbox.contains_point(l, lat))
}

pub(crate) fn crop_swath<T: RasterValue>(
    source: &Raster<T>,
    swath: &SwathGeometry,
    bbox: &BoundingBox,
) -> GeoResult<Raster<T>> {
    let inside: Vec<bool> = swath
        .longitudes()
        .iter()
        .zip(swath.latitudes())
        .map(|(&lon, &lat)| lon.is_finite() && lat.is_finite() && lonlat_inside(bbox, lon, lat))
        .collect();
    let kept = inside.iter().filter(|&&k| k).count();
    if kept == 0 {
        return Err(GeoError::BBoxOutsideData(bbox.as_array()));
    }

    let fill = source.fill_value();
    let mut values = Vec::with_capacity(source.values().len());
    for plane in source.band_planes() {
        values.extend(
            plane
                .iter()
                .zip(&inside)
                .map(|(&v, &keep)| if keep { clean(v, fill) } else { fill }),
        );
    }

    tracing::debug!(kept = kept, total = swath.len(), "Masked swath outside bbox");
    Raster::with_bands(values, source.bands(), swath.clone(), fill)
}
