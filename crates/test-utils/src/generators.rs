//! Test data generators for creating synthetic satellite-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use geo_common::{GeoGrid, Raster, SwathGeometry};

/// Fill value used by the generated rasters.
pub const TEST_FILL: f32 = -999.0;

/// Creates test values with a predictable pattern.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data landed where expected by
/// checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates brightness temperatures in Kelvin.
///
/// Values range from about 200K (cold cloud tops, top-left) to 320K
/// (warm surface, bottom-right).
pub fn create_brightness_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(200.0 + x_factor * 60.0 + y_factor * 60.0);
        }
    }
    data
}

/// Creates reflectances in 0..=1 with scattered bright "clouds".
///
/// Uses a simple hash-based approach for reproducibility.
pub fn create_reflectance_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let value = if hash % 4 == 0 {
                0.6 + (hash % 400) as f32 / 1000.0
            } else {
                0.05 + (hash % 100) as f32 / 1000.0
            };
            data.push(value);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates zeros with [`TEST_FILL`] at the given `(col, row)` positions.
pub fn create_grid_with_fill(width: usize, height: usize, fill_positions: &[(usize, usize)]) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in fill_positions {
        if col < width && row < height {
            data[row * width + col] = TEST_FILL;
        }
    }
    data
}

/// Single-band raster on `grid` holding [`create_test_grid`] values.
pub fn create_test_raster(grid: &GeoGrid) -> Raster<f32> {
    let values = create_test_grid(grid.n_cols(), grid.n_rows());
    Raster::new(values, grid.clone(), TEST_FILL).expect("generated raster matches its grid")
}

/// Synthetic polar-orbiter swath.
///
/// Rows are scan lines along track (northward), columns are samples across
/// track. Pixel spacing is `step` degrees and every pixel is nudged by up
/// to a tenth of a step, deterministically from `seed`, so the geolocation
/// is irregular like real scan geometry.
pub fn create_swath(
    rows: usize,
    cols: usize,
    center_lon: f64,
    center_lat: f64,
    step: f64,
    seed: u32,
) -> SwathGeometry {
    let mut lons = Vec::with_capacity(rows * cols);
    let mut lats = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let jitter = |salt: u32| {
                let h = simple_hash(col as u32, row as u32, seed.wrapping_add(salt));
                ((h % 2001) as f64 / 1000.0 - 1.0) * step * 0.1
            };
            let lon = center_lon + (col as f64 - (cols as f64 - 1.0) / 2.0) * step + jitter(1);
            let lat = center_lat + ((rows as f64 - 1.0) / 2.0 - row as f64) * step + jitter(2);
            lons.push(lon);
            lats.push(lat);
        }
    }
    SwathGeometry::new(lons, lats, rows, cols).expect("generated swath is consistent")
}

/// Single-band raster on a swath holding brightness temperatures.
pub fn create_swath_raster(swath: &SwathGeometry) -> Raster<f32> {
    let (rows, cols) = swath.shape();
    let values = create_brightness_temperature_grid(cols, rows);
    Raster::new(values, swath.clone(), TEST_FILL).expect("generated raster matches its swath")
}
