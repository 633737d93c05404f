//! Raster operations that do not change projection: crop and aggregate.

pub mod aggregate;
pub mod crop;

pub use aggregate::{aggregate_grid, aggregate_swath};
pub use crop::grid_window;

use geo_common::{BoundingBox, GeoError, GeoResult, Geometry, Raster, RasterValue};

use crate::block::reduce_block;
use crate::config::ResampleConfig;
use crate::resample::clean;
use crate::tiling::{CancellationToken, TilePlan};
use crate::types::Reducer;

/// Crop and aggregate with a shared configuration and cancellation token.
#[derive(Debug, Clone, Default)]
pub struct RasterOps {
    config: ResampleConfig,
    cancel: CancellationToken,
}

impl RasterOps {
    pub fn new(config: ResampleConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Restrict a raster to a lon/lat bounding box (degrees).
    ///
    /// Grid rasters are sliced to the pixels whose centres fall inside the
    /// box. Swath rasters keep their shape; pixels outside become fill.
    pub fn crop<T: RasterValue>(&self, raster: &Raster<T>, bbox: &BoundingBox) -> GeoResult<Raster<T>> {
        crop::validate_bbox(bbox)?;
        match raster.geometry() {
            Geometry::Grid(grid) => crop::crop_grid(raster, grid, bbox, self.config.edge_samples),
            Geometry::Swath(swath) => crop::crop_swath(raster, swath, bbox),
        }
    }

    /// Reduce every `block_y × block_x` block of pixels to one.
    pub fn aggregate<T: RasterValue>(
        &self,
        raster: &Raster<T>,
        block_y: usize,
        block_x: usize,
        reducer: &Reducer,
    ) -> GeoResult<Raster<T>> {
        if block_y == 0 || block_x == 0 {
            return Err(GeoError::invalid_geometry(format!(
                "aggregation block {}x{} must be at least 1x1",
                block_y, block_x
            )));
        }
        if block_y == 1 && block_x == 1 {
            let fill = raster.fill_value();
            let values = raster.values().iter().map(|&v| clean(v, fill)).collect();
            return Raster::with_bands(values, raster.bands(), raster.geometry().clone(), fill);
        }

        let geometry = aggregate::aggregate_geometry(raster.geometry(), block_y, block_x)?;
        let (in_rows, in_cols) = raster.shape();
        let (out_rows, out_cols) = geometry.shape();
        let fill = raster.fill_value();

        let plan = TilePlan::new(raster.bands(), out_rows, out_cols, &self.config);
        let mut values = vec![fill; plan.bands * out_rows * out_cols];
        plan.run(&mut values, self.config.parallel, &self.cancel, |band, row, col| {
            reduce_block(
                raster.band(band),
                in_cols,
                row * block_y..((row + 1) * block_y).min(in_rows),
                col * block_x..((col + 1) * block_x).min(in_cols),
                reducer,
                fill,
            )
        })?;

        tracing::debug!(
            reducer = reducer.name(),
            block_y = block_y,
            block_x = block_x,
            out_rows = out_rows,
            out_cols = out_cols,
            "Aggregated raster"
        );
        Raster::with_bands(values, raster.bands(), geometry, fill)
    }
}
