//! Named area definitions loaded from YAML.
//!
//! The document is a map of area name to definition:
//!
//! ```yaml
//! euro_stere:
//!   description: Europe, polar stereographic
//!   projection:
//!     proj: stere
//!     lat_0: 90
//!     lat_ts: 60
//!     lon_0: 14
//!   shape:
//!     height: 1024
//!     width: 1024
//!   area_extent:
//!     lower_left_xy: [-2717181.7, -5571048.1]
//!     upper_right_xy: [1378818.3, -1475048.1]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::bbox::BoundingBox;
use crate::crs::{ProjectionDescriptor, ProjectionFamily};
use crate::error::{GeoError, GeoResult};
use crate::grid::GeoGrid;

/// A named grid with its human-readable description.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaDefinition {
    pub name: String,
    pub description: String,
    pub grid: GeoGrid,
}

#[derive(Debug, Deserialize)]
struct RawArea {
    #[serde(default)]
    description: String,
    projection: BTreeMap<String, serde_yaml::Value>,
    shape: RawShape,
    area_extent: RawExtent,
}

#[derive(Debug, Deserialize)]
struct RawShape {
    height: usize,
    width: usize,
}

#[derive(Debug, Deserialize)]
struct RawExtent {
    lower_left_xy: [f64; 2],
    upper_right_xy: [f64; 2],
}

/// Parse every area in a YAML document.
pub fn parse_areas(yaml: &str) -> GeoResult<BTreeMap<String, AreaDefinition>> {
    let raw: BTreeMap<String, RawArea> = serde_yaml::from_str(yaml)?;
    raw.into_iter()
        .map(|(name, area)| {
            let definition = convert_area(&name, area)?;
            Ok((name, definition))
        })
        .collect()
}

/// Parse a YAML document and return a single named area's grid.
pub fn load_area(yaml: &str, name: &str) -> GeoResult<GeoGrid> {
    parse_areas(yaml)?
        .remove(name)
        .map(|area| area.grid)
        .ok_or_else(|| GeoError::invalid_area(name, "area not found in document"))
}

/// Read and parse an areas file.
pub fn parse_area_file(path: impl AsRef<Path>) -> GeoResult<BTreeMap<String, AreaDefinition>> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)
        .map_err(|e| GeoError::invalid_area(path.display().to_string(), e.to_string()))?;
    parse_areas(&yaml)
}

/// Read an areas file and return a single named area's grid.
pub fn load_area_file(path: impl AsRef<Path>, name: &str) -> GeoResult<GeoGrid> {
    parse_area_file(path)?
        .remove(name)
        .map(|area| area.grid)
        .ok_or_else(|| GeoError::invalid_area(name, "area not found in document"))
}

fn convert_area(name: &str, raw: RawArea) -> GeoResult<AreaDefinition> {
    let proj_name = raw
        .projection
        .get("proj")
        .and_then(serde_yaml::Value::as_str)
        .ok_or_else(|| GeoError::invalid_area(name, "projection.proj must be a string"))?;
    let family = ProjectionFamily::parse(proj_name)
        .map_err(|e| GeoError::invalid_area(name, e.to_string()))?;

    let mut projection = ProjectionDescriptor::new(family);
    for (key, value) in &raw.projection {
        if key == "proj" {
            continue;
        }
        let number = value.as_f64().ok_or_else(|| {
            GeoError::invalid_area(name, format!("projection.{} must be numeric", key))
        })?;
        projection = projection.with_param(key.clone(), number);
    }

    let extent = BoundingBox::new(
        raw.area_extent.lower_left_xy[0],
        raw.area_extent.lower_left_xy[1],
        raw.area_extent.upper_right_xy[0],
        raw.area_extent.upper_right_xy[1],
    );
    let grid = GeoGrid::new(projection, extent, raw.shape.height, raw.shape.width)
        .map_err(|e| GeoError::invalid_area(name, e.to_string()))?;

    Ok(AreaDefinition {
        name: name.to_string(),
        description: raw.description,
        grid,
    })
}
