//! Resampling, cropping and aggregation of geolocated rasters.
//!
//! This crate maps rasters bound to a [`GeoGrid`] or a [`SwathGeometry`]
//! onto target grids. It provides:
//!
//! - **Nearest-neighbour resampling** from grids and swaths (R-tree over
//!   ECEF positions for swaths)
//! - **Native resampling** between same-projection grids by integer factors
//! - **Bilinear interpolation** for grid sources
//! - **Dynamic grids** that cover a set of inputs at a requested resolution
//! - **Crop and aggregate** operations that keep the projection
//!
//! # Architecture
//!
//! ```text
//! ResampleRequest { source, target, method }
//!      │
//!      ▼
//! ResamplingEngine::resample
//!      │
//!      ├─► TargetGeometry::Dynamic ─► DynamicGridResolver::resolve
//!      │
//!      ├─► Resampler (nearest / native / bilinear)
//!      │         │
//!      │         └─► TilePlan::run (rayon, cancellable)
//!      │
//!      └─► Raster bound to the target GeoGrid
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{ResampleConfig, ResampleMethod, ResampleRequest, ResamplingEngine};
//!
//! let engine = ResamplingEngine::new(ResampleConfig::from_env())?;
//! let request = ResampleRequest::new(raster, target_grid, ResampleMethod::Nearest);
//! let output = engine.resample(&request)?;
//! ```
//!
//! [`GeoGrid`]: geo_common::GeoGrid
//! [`SwathGeometry`]: geo_common::SwathGeometry

mod block;
pub mod config;
pub mod dynamic;
pub mod engine;
pub mod ops;
pub mod resample;
pub mod scene;
pub mod spatial_index;
pub mod tiling;
pub mod types;

// Re-export commonly used types at crate root
pub use config::ResampleConfig;
pub use dynamic::DynamicGridResolver;
pub use engine::ResamplingEngine;
pub use ops::RasterOps;
pub use resample::{BilinearResampler, NativeResampler, NearestResampler, Resampler, RunContext};
pub use scene::Scene;
pub use spatial_index::SwathIndex;
pub use tiling::{CancellationToken, TilePlan};
pub use types::{Reducer, ResampleMethod, ResampleRequest, TargetGeometry};

pub use geo_common::{GeoError, GeoResult};
