//! Uniform projected grids.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::crs::ProjectionDescriptor;
use crate::error::{GeoError, GeoResult};

/// A projected, uniformly spaced raster description.
///
/// Corners are the outer edges of the outer pixels in projection units.
/// Row 0 is the top (max y) row, column 0 the left (min x) column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoGridDef", into = "GeoGridDef")]
pub struct GeoGrid {
    projection: ProjectionDescriptor,
    lower_left_x: f64,
    lower_left_y: f64,
    upper_right_x: f64,
    upper_right_y: f64,
    n_rows: usize,
    n_cols: usize,
}

impl GeoGrid {
    /// Create a grid, enforcing the extent and shape invariants.
    pub fn new(
        projection: ProjectionDescriptor,
        extent: BoundingBox,
        n_rows: usize,
        n_cols: usize,
    ) -> GeoResult<Self> {
        if !extent.as_array().iter().all(|v| v.is_finite()) {
            return Err(GeoError::invalid_geometry(format!(
                "grid extent {:?} is not finite",
                extent.as_array()
            )));
        }
        if extent.max_x <= extent.min_x || extent.max_y <= extent.min_y {
            return Err(GeoError::invalid_geometry(format!(
                "grid extent {:?} must have upper right > lower left",
                extent.as_array()
            )));
        }
        if n_rows == 0 || n_cols == 0 {
            return Err(GeoError::invalid_geometry(format!(
                "grid shape {}x{} must be non-empty",
                n_rows, n_cols
            )));
        }

        Ok(Self {
            projection,
            lower_left_x: extent.min_x,
            lower_left_y: extent.min_y,
            upper_right_x: extent.max_x,
            upper_right_y: extent.max_y,
            n_rows,
            n_cols,
        })
    }

    /// Create a grid from its upper-left corner and pixel size.
    pub fn from_origin(
        projection: ProjectionDescriptor,
        upper_left_x: f64,
        upper_left_y: f64,
        pixel_size_x: f64,
        pixel_size_y: f64,
        n_rows: usize,
        n_cols: usize,
    ) -> GeoResult<Self> {
        let extent = BoundingBox::new(
            upper_left_x,
            upper_left_y - pixel_size_y * n_rows as f64,
            upper_left_x + pixel_size_x * n_cols as f64,
            upper_left_y,
        );
        Self::new(projection, extent, n_rows, n_cols)
    }

    pub fn projection(&self) -> &ProjectionDescriptor {
        &self.projection
    }

    pub fn extent(&self) -> BoundingBox {
        BoundingBox::new(
            self.lower_left_x,
            self.lower_left_y,
            self.upper_right_x,
            self.upper_right_y,
        )
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(n_rows, n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.n_rows * self.n_cols
    }

    /// Always false: the constructor rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pixel_size_x(&self) -> f64 {
        (self.upper_right_x - self.lower_left_x) / self.n_cols as f64
    }

    pub fn pixel_size_y(&self) -> f64 {
        (self.upper_right_y - self.lower_left_y) / self.n_rows as f64
    }

    /// Projected coordinates of a pixel centre.
    #[inline]
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.lower_left_x + (col as f64 + 0.5) * self.pixel_size_x(),
            self.upper_right_y - (row as f64 + 0.5) * self.pixel_size_y(),
        )
    }

    /// Fractional `(row, col)` position of a projected point, where integer
    /// values fall on pixel centres.
    #[inline]
    pub fn fractional_index(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.lower_left_x) / self.pixel_size_x() - 0.5;
        let row = (self.upper_right_y - y) / self.pixel_size_y() - 0.5;
        (row, col)
    }

    /// Nearest pixel to a projected point, `None` outside the grid.
    ///
    /// Points exactly between two centres resolve to the lower index.
    pub fn nearest_pixel(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (row_f, col_f) = self.fractional_index(x, y);
        let row_inside = row_f >= -0.5 && row_f <= self.n_rows as f64 - 0.5;
        let col_inside = col_f >= -0.5 && col_f <= self.n_cols as f64 - 0.5;
        if !row_inside || !col_inside {
            return None;
        }
        let row = (row_f - 0.5).ceil().max(0.0) as usize;
        let col = (col_f - 0.5).ceil().max(0.0) as usize;
        Some((row, col))
    }

    /// Outer boundary points in projection coordinates: the four corners
    /// plus `samples` interior points per edge.
    pub fn boundary(&self, samples: usize) -> Vec<(f64, f64)> {
        self.extent().outline(samples)
    }

    /// Whether two grids share projection and pixel lattice orientation.
    pub fn same_projection(&self, other: &GeoGrid) -> bool {
        self.projection == other.projection
    }

    /// Sub-grid covering rows `row_start..row_end` and columns
    /// `col_start..col_end`.
    pub fn slice(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> GeoResult<GeoGrid> {
        if row_start >= row_end || col_start >= col_end || row_end > self.n_rows || col_end > self.n_cols
        {
            return Err(GeoError::invalid_geometry(format!(
                "slice rows {}..{} cols {}..{} outside {}x{} grid",
                row_start, row_end, col_start, col_end, self.n_rows, self.n_cols
            )));
        }

        let psx = self.pixel_size_x();
        let psy = self.pixel_size_y();
        // Reuse the exact outer edges where the slice touches them.
        let min_x = if col_start == 0 {
            self.lower_left_x
        } else {
            self.lower_left_x + col_start as f64 * psx
        };
        let max_x = if col_end == self.n_cols {
            self.upper_right_x
        } else {
            self.lower_left_x + col_end as f64 * psx
        };
        let max_y = if row_start == 0 {
            self.upper_right_y
        } else {
            self.upper_right_y - row_start as f64 * psy
        };
        let min_y = if row_end == self.n_rows {
            self.lower_left_y
        } else {
            self.upper_right_y - row_end as f64 * psy
        };

        GeoGrid::new(
            self.projection.clone(),
            BoundingBox::new(min_x, min_y, max_x, max_y),
            row_end - row_start,
            col_end - col_start,
        )
    }
}

/// Serialized form of a [`GeoGrid`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoGridDef {
    projection: ProjectionDescriptor,
    lower_left_x: f64,
    lower_left_y: f64,
    upper_right_x: f64,
    upper_right_y: f64,
    n_rows: usize,
    n_cols: usize,
}

impl TryFrom<GeoGridDef> for GeoGrid {
    type Error = GeoError;

    fn try_from(def: GeoGridDef) -> GeoResult<Self> {
        GeoGrid::new(
            def.projection,
            BoundingBox::new(
                def.lower_left_x,
                def.lower_left_y,
                def.upper_right_x,
                def.upper_right_y,
            ),
            def.n_rows,
            def.n_cols,
        )
    }
}

impl From<GeoGrid> for GeoGridDef {
    fn from(grid: GeoGrid) -> Self {
        Self {
            projection: grid.projection,
            lower_left_x: grid.lower_left_x,
            lower_left_y: grid.lower_left_y,
            upper_right_x: grid.upper_right_x,
            upper_right_y: grid.upper_right_y,
            n_rows: grid.n_rows,
            n_cols: grid.n_cols,
        }
    }
}
