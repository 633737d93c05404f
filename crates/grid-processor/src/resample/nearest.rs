//! Nearest-neighbour resampling.
//!
//! Grid sources: each target pixel centre is carried into the source
//! projection and snapped to the closest source pixel centre. Swath
//! sources: the target centre's lon/lat is looked up in a [`SwathIndex`].
//! Either way a candidate is used only when its chord distance to the
//! target centre is strictly inside the radius of influence.

use geo_common::{GeoError, GeoGrid, GeoResult, Geometry, Raster, RasterValue, SwathGeometry};
use projection::{Projection, Transformer};

use super::{gather, Resampler, RunContext};
use crate::spatial_index::SwathIndex;
use crate::tiling::TilePlan;
use crate::types::ResampleMethod;

/// Nearest-neighbour resampler.
///
/// Uses `radius_of_influence` from the run's config unless a radius is set
/// here.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestResampler {
    pub radius_of_influence: Option<f64>,
}

impl NearestResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius_of_influence: Some(radius),
        }
    }

    fn radius(&self, ctx: &RunContext<'_>) -> f64 {
        self.radius_of_influence
            .unwrap_or(ctx.config.radius_of_influence)
    }

    /// Source pixel for every target pixel, from a grid source.
    pub fn grid_index_map(
        &self,
        source: &GeoGrid,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Vec<Option<usize>>> {
        let transformer = Transformer::new(target.projection(), source.projection())?;
        let (target_proj, source_proj) = (transformer.source(), transformer.target());
        let src_cols = source.n_cols();
        let radius = self.radius(ctx);

        let plan = TilePlan::new(1, target.n_rows(), target.n_cols(), ctx.config);
        let mut map = vec![None; target.len()];
        plan.run(&mut map, ctx.config.parallel, ctx.cancel, |_, row, col| {
            let (x, y) = target.pixel_center(row, col);
            let Some((sr, sc)) = transformer
                .transform(x, y)
                .and_then(|(sx, sy)| source.nearest_pixel(sx, sy))
            else {
                return Ok(None);
            };

            let (cx, cy) = source.pixel_center(sr, sc);
            let within = target_proj
                .unproject(x, y)
                .zip(source_proj.unproject(cx, cy))
                .is_some_and(|(a, b)| SwathIndex::chord_distance(a, b) < radius);
            Ok(within.then_some(sr * src_cols + sc))
        })?;
        Ok(map)
    }

    /// Source pixel for every target pixel, from a prebuilt swath index.
    pub fn swath_index_map(
        &self,
        index: &SwathIndex,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Vec<Option<usize>>> {
        let target_proj = Projection::from_descriptor(target.projection())?;
        let radius = self.radius(ctx);

        let plan = TilePlan::new(1, target.n_rows(), target.n_cols(), ctx.config);
        let mut map = vec![None; target.len()];
        plan.run(&mut map, ctx.config.parallel, ctx.cancel, |_, row, col| {
            let (x, y) = target.pixel_center(row, col);
            Ok(target_proj
                .unproject(x, y)
                .and_then(|(lon, lat)| index.nearest_within(lon, lat, radius)))
        })?;
        Ok(map)
    }

    /// Resample a swath raster with an index the caller already built.
    pub fn resample_with_index<T: RasterValue>(
        &self,
        source: &Raster<T>,
        index: &SwathIndex,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>> {
        if index.shape() != source.shape() {
            return Err(GeoError::shape_mismatch(
                "swath index",
                source.shape(),
                index.shape(),
            ));
        }
        let map = self.swath_index_map(index, target, ctx)?;
        gather(source, &map, target)
    }

    fn resample_swath<T: RasterValue>(
        &self,
        source: &Raster<T>,
        swath: &SwathGeometry,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>> {
        let index = SwathIndex::build(swath);
        tracing::debug!(
            indexed = index.len(),
            pixels = swath.len(),
            "Built swath index"
        );
        self.resample_with_index(source, &index, target, ctx)
    }
}

impl Resampler for NearestResampler {
    fn method(&self) -> ResampleMethod {
        ResampleMethod::Nearest
    }

    fn check(&self, _source: &Geometry, _target: &GeoGrid) -> GeoResult<()> {
        Ok(())
    }

    fn resample<T: RasterValue>(
        &self,
        source: &Raster<T>,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>> {
        match source.geometry() {
            Geometry::Grid(grid) => {
                let map = self.grid_index_map(grid, target, ctx)?;
                gather(source, &map, target)
            }
            Geometry::Swath(swath) => self.resample_swath(source, swath, target, ctx),
        }
    }
}
