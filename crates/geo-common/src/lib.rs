//! Common geometry, raster and error types shared across the resampling
//! workspace.

pub mod area;
pub mod bbox;
pub mod crs;
pub mod element;
pub mod error;
pub mod grid;
pub mod raster;
pub mod swath;

pub use area::{load_area, load_area_file, parse_area_file, parse_areas, AreaDefinition};
pub use bbox::BoundingBox;
pub use crs::{ProjectionDescriptor, ProjectionFamily};
pub use element::RasterValue;
pub use error::{GeoError, GeoResult};
pub use grid::GeoGrid;
pub use raster::{Geometry, Raster};
pub use swath::SwathGeometry;
