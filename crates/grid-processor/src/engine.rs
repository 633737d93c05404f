//! Resampling entry point.

use geo_common::{GeoGrid, GeoResult, Geometry, Raster, RasterValue};
use std::time::Instant;

use crate::config::ResampleConfig;
use crate::dynamic::DynamicGridResolver;
use crate::resample::{
    BilinearResampler, NativeResampler, NearestResampler, Resampler, RunContext,
};
use crate::spatial_index::SwathIndex;
use crate::tiling::CancellationToken;
use crate::types::{ResampleMethod, ResampleRequest, TargetGeometry};

/// Resamples rasters onto target grids.
///
/// Holds the validated configuration, the dynamic grid resolver built from
/// it and the cancellation token checked by every tiled operation.
#[derive(Debug, Clone)]
pub struct ResamplingEngine {
    config: ResampleConfig,
    resolver: DynamicGridResolver,
    cancel: CancellationToken,
}

impl ResamplingEngine {
    /// Create an engine; fails with `InvalidConfig` on a bad configuration.
    pub fn new(config: ResampleConfig) -> GeoResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver: DynamicGridResolver::from_config(&config),
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Share an existing cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels operations running on this engine.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    pub fn resolver(&self) -> &DynamicGridResolver {
        &self.resolver
    }

    fn context(&self) -> RunContext<'_> {
        RunContext {
            config: &self.config,
            cancel: &self.cancel,
        }
    }

    /// Turn a target description into a concrete grid covering `sources`.
    pub fn resolve_target(&self, target: &TargetGeometry, sources: &[&Geometry]) -> GeoResult<GeoGrid> {
        match target {
            TargetGeometry::Grid(grid) => Ok(grid.clone()),
            TargetGeometry::Dynamic {
                projection,
                pixel_size_x,
                pixel_size_y,
            } => self
                .resolver
                .resolve(sources, projection, *pixel_size_x, *pixel_size_y),
        }
    }

    /// Run a request, resolving a dynamic target over the source first.
    pub fn resample<T: RasterValue>(&self, request: &ResampleRequest<T>) -> GeoResult<Raster<T>> {
        let target = self.resolve_target(&request.target, &[request.source.geometry()])?;
        self.resample_with(&request.source, &target, request.method)
    }

    /// Resample onto `target` with the configured default method.
    pub fn resample_to<T: RasterValue>(&self, source: &Raster<T>, target: &GeoGrid) -> GeoResult<Raster<T>> {
        self.resample_with(source, target, self.config.default_method)
    }

    /// Resample onto `target` with an explicit method.
    pub fn resample_with<T: RasterValue>(
        &self,
        source: &Raster<T>,
        target: &GeoGrid,
        method: ResampleMethod,
    ) -> GeoResult<Raster<T>> {
        let start = Instant::now();
        let ctx = self.context();

        let output = match method {
            ResampleMethod::Nearest => NearestResampler::new().resample(source, target, &ctx)?,
            ResampleMethod::Native => NativeResampler.resample(source, target, &ctx)?,
            ResampleMethod::Bilinear => BilinearResampler.resample(source, target, &ctx)?,
        };

        self.log_output(source, &output, method.as_str(), start);
        Ok(output)
    }

    /// Nearest-neighbour resampling of a swath raster with a prebuilt index.
    ///
    /// The index can be reused across requests on the same swath geometry.
    pub fn resample_swath<T: RasterValue>(
        &self,
        source: &Raster<T>,
        index: &SwathIndex,
        target: &GeoGrid,
    ) -> GeoResult<Raster<T>> {
        let start = Instant::now();
        let output = NearestResampler::new().resample_with_index(source, index, target, &self.context())?;
        self.log_output(source, &output, "nearest", start);
        Ok(output)
    }

    fn log_output<T: RasterValue>(&self, source: &Raster<T>, output: &Raster<T>, method: &str, start: Instant) {
        tracing::debug!(
            method = method,
            source = source.geometry().kind(),
            source_shape = ?source.shape(),
            target_shape = ?output.shape(),
            bands = output.bands(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resampled raster"
        );
        if output.valid_count() == 0 && source.valid_count() > 0 {
            tracing::warn!(
                method = method,
                target_shape = ?output.shape(),
                "Resampled output contains only fill values"
            );
        }
    }
}

impl Default for ResamplingEngine {
    fn default() -> Self {
        let config = ResampleConfig::default();
        Self {
            resolver: DynamicGridResolver::from_config(&config),
            config,
            cancel: CancellationToken::new(),
        }
    }
}
