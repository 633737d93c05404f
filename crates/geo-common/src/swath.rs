//! Swath geolocation: per-pixel longitude/latitude arrays.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{GeoError, GeoResult};

/// Non-uniform geolocation of along-track sensor data.
///
/// Both arrays are row-major with `n_rows * n_cols` entries, degrees.
/// Non-finite entries mark pixels without geolocation and are skipped by
/// every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwathGeometry {
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl SwathGeometry {
    pub fn new(
        longitudes: Vec<f64>,
        latitudes: Vec<f64>,
        n_rows: usize,
        n_cols: usize,
    ) -> GeoResult<Self> {
        if n_rows == 0 || n_cols == 0 {
            return Err(GeoError::invalid_geometry(format!(
                "swath shape {}x{} must be non-empty",
                n_rows, n_cols
            )));
        }
        let expected = n_rows * n_cols;
        if longitudes.len() != expected {
            return Err(GeoError::shape_mismatch(
                "swath longitudes",
                (n_rows, n_cols),
                flat_shape(longitudes.len(), n_cols),
            ));
        }
        if latitudes.len() != expected {
            return Err(GeoError::shape_mismatch(
                "swath latitudes",
                (n_rows, n_cols),
                flat_shape(latitudes.len(), n_cols),
            ));
        }

        Ok(Self {
            longitudes,
            latitudes,
            n_rows,
            n_cols,
        })
    }

    /// Build from nested row vectors (`[[lon, ...], ...]`).
    pub fn from_rows(longitudes: &[Vec<f64>], latitudes: &[Vec<f64>]) -> GeoResult<Self> {
        let n_rows = longitudes.len();
        let n_cols = longitudes.first().map_or(0, Vec::len);
        if latitudes.len() != n_rows || latitudes.first().map_or(0, Vec::len) != n_cols {
            return Err(GeoError::shape_mismatch(
                "swath latitudes",
                (n_rows, n_cols),
                (latitudes.len(), latitudes.first().map_or(0, Vec::len)),
            ));
        }
        if let Some(row) = longitudes
            .iter()
            .chain(latitudes)
            .find(|row| row.len() != n_cols)
        {
            return Err(GeoError::shape_mismatch(
                "swath row",
                (n_rows, n_cols),
                (n_rows, row.len()),
            ));
        }

        Self::new(
            longitudes.concat(),
            latitudes.concat(),
            n_rows,
            n_cols,
        )
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn len(&self) -> usize {
        self.longitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longitudes.is_empty()
    }

    /// `(lon, lat)` of one pixel.
    #[inline]
    pub fn lonlat(&self, row: usize, col: usize) -> (f64, f64) {
        let idx = row * self.n_cols + col;
        (self.longitudes[idx], self.latitudes[idx])
    }

    /// Flat indices of the outer ring of pixels, clockwise from the top-left.
    pub fn boundary_indices(&self) -> Vec<usize> {
        let (rows, cols) = (self.n_rows, self.n_cols);
        if rows == 1 || cols == 1 {
            return (0..rows * cols).collect();
        }

        let mut indices = Vec::with_capacity(2 * (rows + cols));
        indices.extend(0..cols);
        indices.extend((1..rows).map(|r| r * cols + cols - 1));
        indices.extend((0..cols - 1).rev().map(|c| (rows - 1) * cols + c));
        indices.extend((1..rows - 1).rev().map(|r| r * cols));
        indices
    }

    /// Geographic bounding box of the valid pixel centres.
    pub fn lonlat_bounds(&self) -> Option<BoundingBox> {
        let mut bbox = BoundingBox::empty();
        for (&lon, &lat) in self.longitudes.iter().zip(&self.latitudes) {
            if lon.is_finite() && lat.is_finite() {
                bbox.include(lon, lat);
            }
        }
        (!bbox.is_empty()).then_some(bbox)
    }
}

/// Shape of a flat array reported against a row width.
fn flat_shape(len: usize, cols: usize) -> (usize, usize) {
    if len % cols == 0 {
        (len / cols, cols)
    } else {
        (1, len)
    }
}
