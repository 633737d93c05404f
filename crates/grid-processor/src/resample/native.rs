//! Native resampling between grids that share a projection and extent.
//!
//! Each axis either replicates source pixels (target is finer by an integer
//! factor) or averages blocks of source pixels (target is coarser by an
//! integer factor). The axes are independent, so one can go up while the
//! other goes down.

use geo_common::{GeoError, GeoGrid, GeoResult, Geometry, Raster, RasterValue};
use std::ops::Range;

use super::{Resampler, RunContext};
use crate::block::reduce_block;
use crate::tiling::TilePlan;
use crate::types::{ResampleMethod, Reducer};

/// Allowed corner drift, as a fraction of a pixel.
const EXTENT_TOLERANCE: f64 = 1e-6;

/// How one axis maps target pixels onto source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMap {
    /// Every source pixel covers `k` target pixels.
    Replicate(usize),
    /// Every target pixel covers `k` source pixels.
    Reduce(usize),
}

impl AxisMap {
    /// Resolve the mapping from pixel counts; `axis` is used in errors.
    pub fn new(axis: &str, source_len: usize, target_len: usize) -> GeoResult<Self> {
        let non_integer = || GeoError::NonIntegerResolutionRatio {
            axis: axis.to_string(),
            ratio: target_len as f64 / source_len as f64,
        };
        if target_len >= source_len {
            if target_len % source_len != 0 {
                return Err(non_integer());
            }
            Ok(Self::Replicate(target_len / source_len))
        } else {
            if source_len % target_len != 0 {
                return Err(non_integer());
            }
            Ok(Self::Reduce(source_len / target_len))
        }
    }

    /// Source pixels feeding target pixel `i`.
    #[inline]
    pub fn source_range(&self, i: usize) -> Range<usize> {
        match *self {
            Self::Replicate(k) => i / k..i / k + 1,
            Self::Reduce(k) => i * k..(i + 1) * k,
        }
    }
}

/// Replicate / block-average resampler for same-projection grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResampler;

impl NativeResampler {
    /// Validate the grid pair and return the `(y, x)` axis mappings.
    pub fn axis_maps(&self, source: &GeoGrid, target: &GeoGrid) -> GeoResult<(AxisMap, AxisMap)> {
        if !source.same_projection(target) {
            return Err(GeoError::unsupported_pair(
                "native",
                format!("grid in {}", source.projection()),
                format!("grid in {}", target.projection()),
            ));
        }

        let src = source.extent();
        let dst = target.extent();
        let tol_x = EXTENT_TOLERANCE * source.pixel_size_x().min(target.pixel_size_x());
        let tol_y = EXTENT_TOLERANCE * source.pixel_size_y().min(target.pixel_size_y());
        let aligned = (src.min_x - dst.min_x).abs() <= tol_x
            && (src.max_x - dst.max_x).abs() <= tol_x
            && (src.min_y - dst.min_y).abs() <= tol_y
            && (src.max_y - dst.max_y).abs() <= tol_y;
        if !aligned {
            return Err(GeoError::ResolutionMismatch {
                source_extent: src.as_array(),
                target_extent: dst.as_array(),
            });
        }

        let y = AxisMap::new("y", source.n_rows(), target.n_rows())?;
        let x = AxisMap::new("x", source.n_cols(), target.n_cols())?;
        Ok((y, x))
    }
}

impl Resampler for NativeResampler {
    fn method(&self) -> ResampleMethod {
        ResampleMethod::Native
    }

    fn check(&self, source: &Geometry, target: &GeoGrid) -> GeoResult<()> {
        match source {
            Geometry::Grid(grid) => self.axis_maps(grid, target).map(|_| ()),
            Geometry::Swath(_) => Err(GeoError::unsupported_pair("native", "swath", "grid")),
        }
    }

    fn resample<T: RasterValue>(
        &self,
        source: &Raster<T>,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>> {
        let Geometry::Grid(grid) = source.geometry() else {
            return Err(GeoError::unsupported_pair("native", "swath", "grid"));
        };
        let (map_y, map_x) = self.axis_maps(grid, target)?;
        tracing::debug!(?map_y, ?map_x, "Native resampling");

        let fill = source.fill_value();
        let src_cols = grid.n_cols();
        let plan = TilePlan::new(source.bands(), target.n_rows(), target.n_cols(), ctx.config);
        let mut values = vec![fill; plan.bands * target.len()];
        plan.run(&mut values, ctx.config.parallel, ctx.cancel, |band, row, col| {
            reduce_block(
                source.band(band),
                src_cols,
                map_y.source_range(row),
                map_x.source_range(col),
                &Reducer::Mean,
                fill,
            )
        })?;

        Raster::with_bands(values, source.bands(), target.clone(), fill)
    }
}
