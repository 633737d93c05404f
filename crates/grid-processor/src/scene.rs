//! Named collections of rasters processed together.
//!
//! A scene holds the channels of one observation, possibly at different
//! resolutions. Resampling a scene onto a dynamic target resolves a single
//! grid over every channel so all outputs share one geometry.

use geo_common::{BoundingBox, GeoError, GeoGrid, GeoResult, Geometry, Raster, RasterValue};
use std::collections::BTreeMap;

use crate::engine::ResamplingEngine;
use crate::ops::RasterOps;
use crate::types::{Reducer, ResampleMethod, TargetGeometry};

/// Rasters keyed by channel name.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene<T: RasterValue> {
    datasets: BTreeMap<String, Raster<T>>,
}

impl<T: RasterValue> Default for Scene<T> {
    fn default() -> Self {
        Self {
            datasets: BTreeMap::new(),
        }
    }
}

impl<T: RasterValue> Scene<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, raster: Raster<T>) -> Option<Raster<T>> {
        self.datasets.insert(name.into(), raster)
    }

    pub fn get(&self, name: &str) -> Option<&Raster<T>> {
        self.datasets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Raster<T>)> {
        self.datasets.iter().map(|(name, raster)| (name.as_str(), raster))
    }

    fn geometries(&self) -> Vec<&Geometry> {
        self.datasets.values().map(Raster::geometry).collect()
    }

    /// Grid datasets, checked to share one projection.
    fn grids(&self) -> GeoResult<Vec<&GeoGrid>> {
        let grids: Vec<&GeoGrid> = self
            .datasets
            .values()
            .filter_map(|raster| raster.geometry().as_grid())
            .collect();
        let Some(first) = grids.first() else {
            return Err(GeoError::EmptyInputSet);
        };
        if let Some(other) = grids.iter().find(|g| !g.same_projection(first)) {
            return Err(GeoError::invalid_geometry(format!(
                "scene grids use different projections: {} and {}",
                first.projection(),
                other.projection()
            )));
        }
        Ok(grids)
    }

    /// Grid with the most pixels among the grid datasets.
    ///
    /// Ties keep the first dataset by name.
    pub fn finest_grid(&self) -> GeoResult<GeoGrid> {
        let grids = self.grids()?;
        let mut best = grids[0];
        for grid in &grids[1..] {
            if grid.len() > best.len() {
                best = *grid;
            }
        }
        Ok(best.clone())
    }

    /// Grid with the fewest pixels among the grid datasets.
    ///
    /// Ties keep the first dataset by name.
    pub fn coarsest_grid(&self) -> GeoResult<GeoGrid> {
        let grids = self.grids()?;
        let mut best = grids[0];
        for grid in &grids[1..] {
            if grid.len() < best.len() {
                best = *grid;
            }
        }
        Ok(best.clone())
    }

    /// Resample every dataset onto one target.
    ///
    /// A dynamic target is resolved once over all datasets.
    pub fn resample(
        &self,
        engine: &ResamplingEngine,
        target: &TargetGeometry,
        method: ResampleMethod,
    ) -> GeoResult<Scene<T>> {
        let grid = engine.resolve_target(target, &self.geometries())?;
        tracing::debug!(
            datasets = self.len(),
            target_shape = ?grid.shape(),
            method = %method,
            "Resampling scene"
        );

        let mut out = Scene::new();
        for (name, raster) in &self.datasets {
            out.insert(name.clone(), engine.resample_with(raster, &grid, method)?);
        }
        Ok(out)
    }

    pub fn crop(&self, ops: &RasterOps, bbox: &BoundingBox) -> GeoResult<Scene<T>> {
        let mut out = Scene::new();
        for (name, raster) in &self.datasets {
            out.insert(name.clone(), ops.crop(raster, bbox)?);
        }
        Ok(out)
    }

    pub fn aggregate(
        &self,
        ops: &RasterOps,
        block_y: usize,
        block_x: usize,
        reducer: &Reducer,
    ) -> GeoResult<Scene<T>> {
        let mut out = Scene::new();
        for (name, raster) in &self.datasets {
            out.insert(name.clone(), ops.aggregate(raster, block_y, block_x, reducer)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::{ProjectionDescriptor, SwathGeometry};

    fn lonlat_raster(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        let grid = GeoGrid::new(
            ProjectionDescriptor::lonlat(),
            BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            rows,
            cols,
        )
        .unwrap();
        Raster::new(vec![value; rows * cols], grid, -1.0).unwrap()
    }

    fn two_resolution_scene() -> Scene<f32> {
        let mut scene = Scene::new();
        scene.insert("vis", lonlat_raster(4, 4, 1.0));
        scene.insert("ir", lonlat_raster(2, 2, 2.0));
        scene
    }

    #[test]
    fn test_finest_and_coarsest() {
        let scene = two_resolution_scene();
        assert_eq!(scene.finest_grid().unwrap().shape(), (4, 4));
        assert_eq!(scene.coarsest_grid().unwrap().shape(), (2, 2));
        assert_eq!(scene.names().collect::<Vec<_>>(), vec!["ir", "vis"]);
    }

    #[test]
    fn test_native_to_finest() {
        let scene = two_resolution_scene();
        let engine = ResamplingEngine::default();
        let target = TargetGeometry::Grid(scene.finest_grid().unwrap());

        let out = scene.resample(&engine, &target, ResampleMethod::Native).unwrap();
        assert_eq!(out.len(), 2);
        for (_, raster) in out.iter() {
            assert_eq!(raster.shape(), (4, 4));
        }
        assert!(out.get("ir").unwrap().values().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_dynamic_target_shared() {
        let mut scene = Scene::new();
        scene.insert("a", lonlat_raster(2, 2, 1.0));
        let swath = SwathGeometry::new(vec![6.0], vec![2.0], 1, 1).unwrap();
        scene.insert("b", Raster::new(vec![5.0f32], swath, -1.0).unwrap());

        let target = TargetGeometry::Dynamic {
            projection: ProjectionDescriptor::lonlat(),
            pixel_size_x: 1.0,
            pixel_size_y: 1.0,
        };
        let out = scene
            .resample(&ResamplingEngine::default(), &target, ResampleMethod::Nearest)
            .unwrap();
        let a = out.get("a").unwrap().geometry();
        let b = out.get("b").unwrap().geometry();
        assert_eq!(a, b);
        assert_eq!(a.shape(), (4, 7));
    }

    #[test]
    fn test_no_grids() {
        let scene: Scene<f32> = Scene::new();
        assert_eq!(scene.finest_grid().unwrap_err(), GeoError::EmptyInputSet);
    }
}
