//! Resampling methods.
//!
//! Nearest and bilinear build a per-pixel lookup (an index or a four-point
//! stencil into the source) once, tile by tile, and then apply it to every
//! band. Native works directly on blocks of the source.

pub mod bilinear;
pub mod native;
pub mod nearest;

pub use bilinear::BilinearResampler;
pub use native::NativeResampler;
pub use nearest::NearestResampler;

use geo_common::{GeoGrid, GeoResult, Geometry, Raster, RasterValue};

use crate::config::ResampleConfig;
use crate::tiling::CancellationToken;
use crate::types::ResampleMethod;

/// Settings and cancellation shared by one resampling run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a ResampleConfig,
    pub cancel: &'a CancellationToken,
}

/// A resampling method from a source raster onto a target grid.
pub trait Resampler {
    fn method(&self) -> ResampleMethod;

    /// Fail early when the method cannot map `source` onto `target`.
    fn check(&self, source: &Geometry, target: &GeoGrid) -> GeoResult<()>;

    /// Resample every band of `source` onto `target`.
    fn resample<T: RasterValue>(
        &self,
        source: &Raster<T>,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>>;
}

/// Map a source value into the output: missing or non-finite becomes fill.
#[inline]
pub(crate) fn clean<T: RasterValue>(value: T, fill: T) -> T {
    if value.is_missing(fill) || !value.to_f64_lossy().is_finite() {
        fill
    } else {
        value
    }
}

/// Apply a flat index map (one entry per target pixel) to every band.
pub(crate) fn gather<T: RasterValue>(
    source: &Raster<T>,
    map: &[Option<usize>],
    target: &GeoGrid,
) -> GeoResult<Raster<T>> {
    let fill = source.fill_value();
    let mut values = Vec::with_capacity(source.bands() * map.len());
    for plane in source.band_planes() {
        values.extend(
            map.iter()
                .map(|entry| entry.map_or(fill, |i| clean(plane[i], fill))),
        );
    }
    Raster::with_bands(values, source.bands(), target.clone(), fill)
}
