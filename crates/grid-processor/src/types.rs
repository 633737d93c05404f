//! Core types for resampling requests.

use geo_common::{GeoError, GeoGrid, ProjectionDescriptor, Raster, RasterValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Resampling method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Nearest source pixel (preserves exact values).
    #[default]
    Nearest,
    /// Same-projection replicate / block average by integer factors.
    Native,
    /// Four-neighbour interpolation (grid sources only).
    Bilinear,
}

impl ResampleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Native => "native",
            Self::Bilinear => "bilinear",
        }
    }
}

impl FromStr for ResampleMethod {
    type Err = GeoError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" | "nn" => Ok(Self::Nearest),
            "native" => Ok(Self::Native),
            "bilinear" => Ok(Self::Bilinear),
            other => Err(GeoError::InvalidConfig(format!(
                "unknown resampling method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a resampled raster should land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGeometry {
    /// A fully specified grid.
    Grid(GeoGrid),
    /// Projection and resolution only; the extent is resolved from the
    /// source geometry.
    Dynamic {
        projection: ProjectionDescriptor,
        pixel_size_x: f64,
        pixel_size_y: f64,
    },
}

impl From<GeoGrid> for TargetGeometry {
    fn from(grid: GeoGrid) -> Self {
        TargetGeometry::Grid(grid)
    }
}

/// A single resampling job.
#[derive(Debug, Clone)]
pub struct ResampleRequest<T: RasterValue> {
    pub source: Raster<T>,
    pub target: TargetGeometry,
    pub method: ResampleMethod,
}

impl<T: RasterValue> ResampleRequest<T> {
    pub fn new(source: Raster<T>, target: impl Into<TargetGeometry>, method: ResampleMethod) -> Self {
        Self {
            source,
            target: target.into(),
            method,
        }
    }
}

/// Combines the valid values of a block into one value.
///
/// Every reducer ignores missing values; a block with no valid values
/// produces the fill value.
#[derive(Clone)]
pub enum Reducer {
    /// Arithmetic mean (good for continuous data such as radiances).
    Mean,
    /// Maximum, preserves peaks.
    Max,
    /// Minimum.
    Min,
    /// Sum, for accumulations.
    Sum,
    /// Pairwise fold; must be associative and commutative.
    Custom(Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>),
}

impl Reducer {
    /// Wrap a closure as a custom reducer.
    pub fn custom(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reducer::{}", self.name())
    }
}

impl FromStr for Reducer {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" | "average" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "sum" => Ok(Self::Sum),
            other => Err(GeoError::InvalidConfig(format!("unknown reducer '{}'", other))),
        }
    }
}
