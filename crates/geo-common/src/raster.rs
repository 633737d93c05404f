//! Raster values paired with their geometry.

use serde::{Deserialize, Serialize};

use crate::element::RasterValue;
use crate::error::{GeoError, GeoResult};
use crate::grid::GeoGrid;
use crate::swath::SwathGeometry;

/// Where a raster's pixels are on the earth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Grid(GeoGrid),
    Swath(SwathGeometry),
}

impl Geometry {
    /// `(n_rows, n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Geometry::Grid(grid) => grid.shape(),
            Geometry::Swath(swath) => swath.shape(),
        }
    }

    /// Short name used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Grid(_) => "grid",
            Geometry::Swath(_) => "swath",
        }
    }

    pub fn as_grid(&self) -> Option<&GeoGrid> {
        match self {
            Geometry::Grid(grid) => Some(grid),
            Geometry::Swath(_) => None,
        }
    }

    pub fn as_swath(&self) -> Option<&SwathGeometry> {
        match self {
            Geometry::Swath(swath) => Some(swath),
            Geometry::Grid(_) => None,
        }
    }
}

impl From<GeoGrid> for Geometry {
    fn from(grid: GeoGrid) -> Self {
        Geometry::Grid(grid)
    }
}

impl From<SwathGeometry> for Geometry {
    fn from(swath: SwathGeometry) -> Self {
        Geometry::Swath(swath)
    }
}

/// Raster values bound to a geometry.
///
/// Values are band-sequential and row-major: `values[(band * n_rows + row)
/// * n_cols + col]`. A value equal to `fill_value` (or NaN) is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterValue> {
    values: Vec<T>,
    bands: usize,
    geometry: Geometry,
    fill_value: T,
}

impl<T: RasterValue> Raster<T> {
    /// Single-band raster.
    pub fn new(values: Vec<T>, geometry: impl Into<Geometry>, fill_value: T) -> GeoResult<Self> {
        Self::with_bands(values, 1, geometry, fill_value)
    }

    /// Multi-band raster; fails with `ShapeMismatch` when the value count
    /// does not equal `bands * n_rows * n_cols`.
    pub fn with_bands(
        values: Vec<T>,
        bands: usize,
        geometry: impl Into<Geometry>,
        fill_value: T,
    ) -> GeoResult<Self> {
        let geometry = geometry.into();
        if bands == 0 {
            return Err(GeoError::invalid_geometry("raster needs at least one band"));
        }
        let (rows, cols) = geometry.shape();
        let plane = rows * cols;
        if values.len() != bands * plane {
            // Shapes are reported as (band-stacked rows, cols); a length that
            // does not split into whole rows is reported as one flat row.
            let actual = if values.len() % cols == 0 {
                (values.len() / cols, cols)
            } else {
                (1, values.len())
            };
            return Err(GeoError::shape_mismatch(
                format!("raster values ({} band(s))", bands),
                (bands * rows, cols),
                actual,
            ));
        }

        Ok(Self {
            values,
            bands,
            geometry,
            fill_value,
        })
    }

    /// Raster where every pixel is the fill value.
    pub fn filled(geometry: impl Into<Geometry>, bands: usize, fill_value: T) -> GeoResult<Self> {
        let geometry = geometry.into();
        let (rows, cols) = geometry.shape();
        Self::with_bands(vec![fill_value; bands * rows * cols], bands, geometry, fill_value)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    /// `(n_rows, n_cols)` of one band.
    pub fn shape(&self) -> (usize, usize) {
        self.geometry.shape()
    }

    /// Values of one band.
    pub fn band(&self, band: usize) -> &[T] {
        let plane = self.plane_len();
        &self.values[band * plane..(band + 1) * plane]
    }

    /// Iterator over band planes.
    pub fn band_planes(&self) -> impl Iterator<Item = &[T]> {
        self.values.chunks_exact(self.plane_len())
    }

    /// Value at `(band, row, col)`, `None` out of range.
    pub fn get(&self, band: usize, row: usize, col: usize) -> Option<T> {
        let (rows, cols) = self.shape();
        if band >= self.bands || row >= rows || col >= cols {
            return None;
        }
        self.values.get((band * rows + row) * cols + col).copied()
    }

    /// Number of pixels in one band.
    pub fn plane_len(&self) -> usize {
        let (rows, cols) = self.shape();
        rows * cols
    }

    /// Count of values that are not missing.
    pub fn valid_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_missing(self.fill_value))
            .count()
    }

    /// Every value is finite or exactly the fill value.
    pub fn is_clean(&self) -> bool {
        self.values
            .iter()
            .all(|v| *v == self.fill_value || v.to_f64_lossy().is_finite())
    }
}
