//! Block aggregation (coarsening).
//!
//! Every output pixel reduces a `block_y × block_x` block of input pixels.
//! Blocks along the south and east edges may be partial. The output grid
//! keeps the north-west corner and grows outward to whole blocks.

use geo_common::{BoundingBox, GeoGrid, GeoResult, Geometry, SwathGeometry};

/// Output geometry for a grid aggregated by `block_y × block_x`.
pub fn aggregate_grid(grid: &GeoGrid, block_y: usize, block_x: usize) -> GeoResult<GeoGrid> {
    let (rows, cols) = grid.shape();
    let out_rows = rows.div_ceil(block_y);
    let out_cols = cols.div_ceil(block_x);
    let extent = grid.extent();

    let max_x = if cols % block_x == 0 {
        extent.max_x
    } else {
        extent.min_x + (out_cols * block_x) as f64 * grid.pixel_size_x()
    };
    let min_y = if rows % block_y == 0 {
        extent.min_y
    } else {
        extent.max_y - (out_rows * block_y) as f64 * grid.pixel_size_y()
    };

    GeoGrid::new(
        grid.projection().clone(),
        BoundingBox::new(extent.min_x, min_y, max_x, extent.max_y),
        out_rows,
        out_cols,
    )
}

/// Output geometry for a swath aggregated by `block_y × block_x`: the
/// geolocation of every block is its average position.
pub fn aggregate_swath(
    swath: &SwathGeometry,
    block_y: usize,
    block_x: usize,
) -> GeoResult<SwathGeometry> {
    let (rows, cols) = swath.shape();
    let out_rows = rows.div_ceil(block_y);
    let out_cols = cols.div_ceil(block_x);

    let mut lons = Vec::with_capacity(out_rows * out_cols);
    let mut lats = Vec::with_capacity(out_rows * out_cols);
    for br in 0..out_rows {
        for bc in 0..out_cols {
            let block_rows = br * block_y..((br + 1) * block_y).min(rows);
            let block_cols = bc * block_x..((bc + 1) * block_x).min(cols);

            let mut reference = None;
            let (mut sum_lon, mut sum_lat, mut count) = (0.0, 0.0, 0usize);
            for r in block_rows {
                for c in block_cols.clone() {
                    let (lon, lat) = swath.lonlat(r, c);
                    if !lon.is_finite() || !lat.is_finite() {
                        continue;
                    }
                    // Average longitudes as offsets from the first one so a
                    // block straddling the antimeridian stays together.
                    let base = *reference.get_or_insert(lon);
                    sum_lon += base + wrap_lon(lon - base);
                    sum_lat += lat;
                    count += 1;
                }
            }

            if count == 0 {
                lons.push(f64::NAN);
                lats.push(f64::NAN);
            } else {
                lons.push(wrap_lon(sum_lon / count as f64));
                lats.push(sum_lat / count as f64);
            }
        }
    }

    SwathGeometry::new(lons, lats, out_rows, out_cols)
}

/// Aggregated geometry of either kind.
pub(crate) fn aggregate_geometry(
    geometry: &Geometry,
    block_y: usize,
    block_x: usize,
) -> GeoResult<Geometry> {
    Ok(match geometry {
        Geometry::Grid(grid) => Geometry::Grid(aggregate_grid(grid, block_y, block_x)?),
        Geometry::Swath(swath) => Geometry::Swath(aggregate_swath(swath, block_y, block_x)?),
    })
}

/// Longitude into [-180, 180).
fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
