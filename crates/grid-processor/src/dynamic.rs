//! Dynamic grid resolution.
//!
//! Computes the smallest grid in a target projection, at a requested pixel
//! size, that covers a set of input geometries. Grid inputs contribute their
//! outer boundary; swath inputs contribute their geolocated pixels.
//!
//! A grid whose boundary is partly without an image in the target (a
//! geostationary full disk has its corners in space) is traced instead:
//! lines across the grid are walked and the edge of the region with an
//! image is located by bisection.

use geo_common::{BoundingBox, GeoError, GeoGrid, GeoResult, Geometry, ProjectionDescriptor};
use projection::{Projection, Transformer};
use std::time::Instant;

use crate::config::ResampleConfig;

/// Relative tolerance under which a span counts as an exact pixel multiple.
const PIXEL_TOLERANCE: f64 = 1e-9;

/// Largest pixel count accepted along one axis.
const MAX_AXIS_PIXELS: f64 = (1u64 << 32) as f64;

/// Lines traced in each direction across a grid with unprojectable edges.
const TRACE_LINES: usize = 64;

/// Halvings used to locate the edge of the region with an image.
const EDGE_BISECTIONS: usize = 40;

/// Resolves the covering grid of a set of geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicGridResolver {
    /// Interior points sampled along each edge of a grid input.
    pub edge_samples: usize,
    /// Use only the outer ring of swath pixels.
    pub swath_boundary_only: bool,
}

impl Default for DynamicGridResolver {
    fn default() -> Self {
        Self::from_config(&ResampleConfig::default())
    }
}

impl DynamicGridResolver {
    pub fn from_config(config: &ResampleConfig) -> Self {
        Self {
            edge_samples: config.edge_samples,
            swath_boundary_only: config.swath_boundary_only,
        }
    }

    /// Resolve a grid in `projection` with the given pixel sizes that covers
    /// every geometry.
    pub fn resolve(
        &self,
        geometries: &[&Geometry],
        projection: &ProjectionDescriptor,
        pixel_size_x: f64,
        pixel_size_y: f64,
    ) -> GeoResult<GeoGrid> {
        let start = Instant::now();

        if geometries.is_empty() {
            return Err(GeoError::EmptyInputSet);
        }
        for (axis, size) in [("x", pixel_size_x), ("y", pixel_size_y)] {
            if !(size.is_finite() && size > 0.0) {
                return Err(GeoError::invalid_geometry(format!(
                    "pixel size along {} must be positive, got {}",
                    axis, size
                )));
            }
        }

        let target = Projection::from_descriptor(projection)?;
        let mut extent = BoundingBox::empty();
        let mut contributing = 0usize;

        for geometry in geometries {
            let bounds = match geometry {
                Geometry::Grid(grid) => self.grid_bounds(grid, projection)?,
                Geometry::Swath(swath) => {
                    let indices: Box<dyn Iterator<Item = usize>> = if self.swath_boundary_only {
                        Box::new(swath.boundary_indices().into_iter())
                    } else {
                        Box::new(0..swath.len())
                    };
                    let mut bounds = BoundingBox::empty();
                    for i in indices {
                        let lon = swath.longitudes()[i];
                        let lat = swath.latitudes()[i];
                        if let Some((x, y)) = target.project(lon, lat) {
                            bounds.include(x, y);
                        }
                    }
                    // Pixel centres, so pad by half a target pixel
                    if !bounds.is_empty() {
                        bounds = BoundingBox::new(
                            bounds.min_x - pixel_size_x / 2.0,
                            bounds.min_y - pixel_size_y / 2.0,
                            bounds.max_x + pixel_size_x / 2.0,
                            bounds.max_y + pixel_size_y / 2.0,
                        );
                    }
                    bounds
                }
            };
            if !bounds.is_empty() {
                contributing += 1;
                extent = extent.union(&bounds);
            }
        }

        if contributing == 0 {
            return Err(GeoError::DegenerateExtent {
                width_px: 0,
                height_px: 0,
            });
        }

        let n_cols = pixel_count(extent.width(), pixel_size_x)?;
        let n_rows = pixel_count(extent.height(), pixel_size_y)?;
        if n_cols == 0 || n_rows == 0 {
            return Err(GeoError::DegenerateExtent {
                width_px: n_cols,
                height_px: n_rows,
            });
        }
        if n_rows.checked_mul(n_cols).is_none() {
            return Err(GeoError::ExtentOverflow(format!(
                "{} x {} pixels",
                n_rows, n_cols
            )));
        }

        let resolved = BoundingBox::new(
            extent.min_x,
            extent.min_y,
            snap_edge(extent.min_x, extent.max_x, n_cols, pixel_size_x),
            snap_edge(extent.min_y, extent.max_y, n_rows, pixel_size_y),
        );
        if !resolved.as_array().iter().all(|v| v.is_finite()) {
            return Err(GeoError::ExtentOverflow(format!("{:?}", resolved.as_array())));
        }

        let grid = GeoGrid::new(projection.clone(), resolved, n_rows, n_cols)?;

        tracing::info!(
            projection = %projection,
            n_rows = n_rows,
            n_cols = n_cols,
            extent = ?resolved.as_array(),
            "Resolved dynamic grid"
        );
        tracing::debug!(
            inputs = geometries.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Dynamic grid resolution complete"
        );

        Ok(grid)
    }

    /// Target-projection bounds of a grid's outer boundary.
    fn grid_bounds(&self, grid: &GeoGrid, projection: &ProjectionDescriptor) -> GeoResult<BoundingBox> {
        let transformer = Transformer::new(grid.projection(), projection)?;
        let mut bounds = BoundingBox::empty();
        let mut skipped = 0usize;
        for (x, y) in grid.boundary(self.edge_samples) {
            match transformer.transform(x, y) {
                Some((tx, ty)) => bounds.include(tx, ty),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(
                skipped = skipped,
                projection = %grid.projection(),
                "Grid boundary partly unprojectable, tracing interior"
            );
            trace_grid(grid, &transformer, &mut bounds);
        }
        Ok(bounds)
    }
}

/// Include every traced point of `grid` that has an image, plus the edge of
/// the region with an image along each traced line.
fn trace_grid(grid: &GeoGrid, transformer: &Transformer, bounds: &mut BoundingBox) {
    let extent = grid.extent();
    let at = |i: usize, lo: f64, hi: f64| lo + (hi - lo) * i as f64 / TRACE_LINES as f64;

    for i in 0..=TRACE_LINES {
        let y = at(i, extent.min_y, extent.max_y);
        let row: Vec<(f64, f64)> = (0..=TRACE_LINES)
            .map(|j| (at(j, extent.min_x, extent.max_x), y))
            .collect();
        trace_line(transformer, &row, bounds);

        let x = at(i, extent.min_x, extent.max_x);
        let column: Vec<(f64, f64)> = (0..=TRACE_LINES)
            .map(|j| (x, at(j, extent.min_y, extent.max_y)))
            .collect();
        trace_line(transformer, &column, bounds);
    }
}

fn trace_line(transformer: &Transformer, points: &[(f64, f64)], bounds: &mut BoundingBox) {
    let images: Vec<Option<(f64, f64)>> = points
        .iter()
        .map(|&(x, y)| transformer.transform(x, y))
        .collect();

    for i in 0..points.len() {
        if let Some((tx, ty)) = images[i] {
            bounds.include(tx, ty);
        }
        if i == 0 {
            continue;
        }
        let edge = match (images[i - 1], images[i]) {
            (Some(_), None) => bisect_edge(transformer, points[i - 1], points[i]),
            (None, Some(_)) => bisect_edge(transformer, points[i], points[i - 1]),
            _ => None,
        };
        if let Some((tx, ty)) = edge {
            bounds.include(tx, ty);
        }
    }
}

/// Image of the last point with one on the segment from `inside` (has an
/// image) towards `outside` (has none).
fn bisect_edge(
    transformer: &Transformer,
    inside: (f64, f64),
    outside: (f64, f64),
) -> Option<(f64, f64)> {
    let (mut a, mut b) = (inside, outside);
    let mut last = transformer.transform(a.0, a.1)?;
    for _ in 0..EDGE_BISECTIONS {
        let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        match transformer.transform(mid.0, mid.1) {
            Some(image) => {
                a = mid;
                last = image;
            }
            None => b = mid,
        }
    }
    Some(last)
}

/// Whole pixels needed to cover `span`.
fn pixel_count(span: f64, pixel_size: f64) -> GeoResult<usize> {
    let n = span / pixel_size;
    if !n.is_finite() {
        return Err(GeoError::ExtentOverflow(format!(
            "span {} at pixel size {}",
            span, pixel_size
        )));
    }
    let rounded = n.round();
    let n = if (n - rounded).abs() <= PIXEL_TOLERANCE * rounded.max(1.0) {
        rounded
    } else {
        n.ceil()
    };
    if n > MAX_AXIS_PIXELS {
        return Err(GeoError::ExtentOverflow(format!(
            "{} pixels along one axis",
            n
        )));
    }
    Ok(n as usize)
}

/// Upper edge after rounding out to whole pixels; keeps the measured edge
/// when it already sits on a pixel boundary.
fn snap_edge(min: f64, max: f64, n: usize, pixel_size: f64) -> f64 {
    let edge = min + n as f64 * pixel_size;
    if (edge - max).abs() <= PIXEL_TOLERANCE * pixel_size * n as f64 {
        max
    } else {
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::SwathGeometry;

    fn lonlat_grid(extent: BoundingBox, rows: usize, cols: usize) -> Geometry {
        Geometry::Grid(GeoGrid::new(ProjectionDescriptor::lonlat(), extent, rows, cols).unwrap())
    }

    #[test]
    fn test_grid_reproduces_own_extent() {
        let geometry = lonlat_grid(BoundingBox::new(-10.0, 20.0, 10.0, 30.0), 10, 20);
        let grid = DynamicGridResolver::default()
            .resolve(&[&geometry], &ProjectionDescriptor::lonlat(), 1.0, 1.0)
            .unwrap();
        assert_eq!(grid.shape(), (10, 20));
        assert_eq!(grid.extent(), BoundingBox::new(-10.0, 20.0, 10.0, 30.0));
    }

    #[test]
    fn test_rounds_outward() {
        let geometry = lonlat_grid(BoundingBox::new(0.0, 0.0, 2.5, 1.2), 1, 1);
        let grid = DynamicGridResolver::default()
            .resolve(&[&geometry], &ProjectionDescriptor::lonlat(), 1.0, 1.0)
            .unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.extent(), BoundingBox::new(0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn test_union_of_inputs() {
        let a = lonlat_grid(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1, 1);
        let b = lonlat_grid(BoundingBox::new(3.0, -2.0, 4.0, 0.0), 1, 1);
        let grid = DynamicGridResolver::default()
            .resolve(&[&a, &b], &ProjectionDescriptor::lonlat(), 0.5, 0.5)
            .unwrap();
        assert_eq!(grid.shape(), (6, 8));
        assert_eq!(grid.extent(), BoundingBox::new(0.0, -2.0, 4.0, 1.0));
    }

    #[test]
    fn test_swath_is_padded_by_half_pixel() {
        let swath = Geometry::Swath(
            SwathGeometry::new(vec![0.0, 1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0, 0.0], 2, 2).unwrap(),
        );
        let grid = DynamicGridResolver::default()
            .resolve(&[&swath], &ProjectionDescriptor::lonlat(), 1.0, 1.0)
            .unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.pixel_center(0, 0), (0.0, 1.0));
        assert_eq!(grid.pixel_center(1, 1), (1.0, 0.0));
    }

    #[test]
    fn test_swath_boundary_only() {
        let lons = vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let lats = vec![2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let swath = Geometry::Swath(SwathGeometry::new(lons, lats, 3, 3).unwrap());

        let full = DynamicGridResolver::default()
            .resolve(&[&swath], &ProjectionDescriptor::lonlat(), 1.0, 1.0)
            .unwrap();
        let ring = DynamicGridResolver {
            swath_boundary_only: true,
            ..Default::default()
        }
        .resolve(&[&swath], &ProjectionDescriptor::lonlat(), 1.0, 1.0)
        .unwrap();
        assert_eq!(full, ring);
    }

    #[test]
    fn test_errors() {
        let resolver = DynamicGridResolver::default();
        let lonlat = ProjectionDescriptor::lonlat();

        assert_eq!(
            resolver.resolve(&[], &lonlat, 1.0, 1.0).unwrap_err(),
            GeoError::EmptyInputSet
        );

        let geometry = lonlat_grid(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1, 1);
        assert!(matches!(
            resolver.resolve(&[&geometry], &lonlat, 0.0, 1.0),
            Err(GeoError::InvalidGeometry(_))
        ));
        assert!(matches!(
            resolver.resolve(&[&geometry], &lonlat, 1e-300, 1e-300),
            Err(GeoError::ExtentOverflow(_))
        ));

        let nowhere = Geometry::Swath(SwathGeometry::new(vec![f64::NAN], vec![f64::NAN], 1, 1).unwrap());
        assert!(matches!(
            resolver.resolve(&[&nowhere], &lonlat, 1.0, 1.0),
            Err(GeoError::DegenerateExtent { .. })
        ));
    }

    #[test]
    fn test_deterministic() {
        let geometry = Geometry::Grid(test_hrrr_like());
        let resolver = DynamicGridResolver::default();
        let lonlat = ProjectionDescriptor::lonlat();
        let a = resolver.resolve(&[&geometry], &lonlat, 0.1, 0.1).unwrap();
        let b = resolver.resolve(&[&geometry], &lonlat, 0.1, 0.1).unwrap();
        assert_eq!(a, b);
        // HRRR spans roughly 134W..61W and 21N..53N
        let extent = a.extent();
        assert!(extent.min_x < -130.0 && extent.max_x > -65.0);
        assert!(extent.min_y < 22.0 && extent.max_y > 50.0);
    }

    #[test]
    fn test_geostationary_full_disk() {
        // Every corner and edge midpoint of a full disk lies in space
        let disk = Geometry::Grid(
            GeoGrid::new(
                ProjectionDescriptor::goes_east(),
                BoundingBox::new(-5_434_894.67, -5_434_894.67, 5_434_894.67, 5_434_894.67),
                5424,
                5424,
            )
            .unwrap(),
        );
        let grid = DynamicGridResolver::default()
            .resolve(&[&disk], &ProjectionDescriptor::lonlat(), 0.1, 0.1)
            .unwrap();

        // Visible limb: about 81.3 degrees of arc around (-75.2, 0)
        let extent = grid.extent();
        assert!(extent.min_x > -157.5 && extent.min_x < -155.5, "min_x = {}", extent.min_x);
        assert!(extent.max_x > 5.0 && extent.max_x < 7.0, "max_x = {}", extent.max_x);
        assert!(extent.min_y > -82.5 && extent.min_y < -80.0, "min_y = {}", extent.min_y);
        assert!(extent.max_y > 80.0 && extent.max_y < 82.5, "max_y = {}", extent.max_y);
    }

    #[test]
    fn test_geostationary_window() {
        // A disk sub-window that is entirely on the earth is bounded by its edges
        let window = Geometry::Grid(
            GeoGrid::new(
                ProjectionDescriptor::goes_east(),
                BoundingBox::new(-1_000_000.0, -1_000_000.0, 1_000_000.0, 1_000_000.0),
                100,
                100,
            )
            .unwrap(),
        );
        let grid = DynamicGridResolver::default()
            .resolve(&[&window], &ProjectionDescriptor::lonlat(), 0.1, 0.1)
            .unwrap();
        let extent = grid.extent();
        assert!(extent.min_x > -90.0 && extent.max_x < -60.0);
        assert!(extent.min_y > -15.0 && extent.max_y < 15.0);
    }

    fn test_hrrr_like() -> GeoGrid {
        GeoGrid::from_origin(
            ProjectionDescriptor::hrrr_lcc(),
            -2_699_020.0,
            1_588_193.0,
            3000.0,
            3000.0,
            1059,
            1799,
        )
        .unwrap()
    }
}
