//! Error types for the resampling engine.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Primary error type for geometry, projection and resampling operations.
///
/// Every variant carries enough context to diagnose the failure without
/// re-running the request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    // === Projection Errors ===
    #[error("Invalid parameter '{param}' for {family} projection: {reason}")]
    InvalidProjectionParameters {
        family: String,
        param: String,
        reason: String,
    },

    // === Geometry Errors ===
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid area definition '{area}': {reason}")]
    InvalidAreaDefinition { area: String, reason: String },

    // === Dynamic Area Errors ===
    #[error("Dynamic area needs at least one input geometry")]
    EmptyInputSet,

    #[error("Resolved extent is degenerate: {width_px}x{height_px} pixels")]
    DegenerateExtent { width_px: usize, height_px: usize },

    #[error("Extent cannot be represented: {0}")]
    ExtentOverflow(String),

    // === Resampling Errors ===
    #[error("Resolution ratio along {axis} is not an integer: {ratio}")]
    NonIntegerResolutionRatio { axis: String, ratio: f64 },

    #[error("Method '{method}' does not support {source_kind} -> {target_kind}")]
    UnsupportedMethodForGeometryPair {
        method: String,
        source_kind: String,
        target_kind: String,
    },

    #[error("Resolution mismatch: source {source_extent:?} vs target {target_extent:?}")]
    ResolutionMismatch {
        source_extent: [f64; 4],
        target_extent: [f64; 4],
    },

    #[error("Bounding box {0:?} does not contain any pixel centre")]
    BBoxOutsideData([f64; 4]),

    #[error("Value {value} does not fit the raster element type")]
    NumericOverflow { value: f64 },

    #[error("Operation cancelled after {completed_tiles} of {total_tiles} tiles")]
    Cancelled {
        completed_tiles: usize,
        total_tiles: usize,
    },

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeoError {
    /// Create an InvalidProjectionParameters error.
    pub fn invalid_parameter(
        family: impl Into<String>,
        param: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidProjectionParameters {
            family: family.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Create an UnsupportedMethodForGeometryPair error.
    pub fn unsupported_pair(
        method: impl Into<String>,
        source_kind: impl Into<String>,
        target_kind: impl Into<String>,
    ) -> Self {
        Self::UnsupportedMethodForGeometryPair {
            method: method.into(),
            source_kind: source_kind.into(),
            target_kind: target_kind.into(),
        }
    }

    /// Create an InvalidAreaDefinition error.
    pub fn invalid_area(area: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAreaDefinition {
            area: area.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the identical request can succeed.
    ///
    /// Only cancellation is transient; every other failure is a property of
    /// the request itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeoError::Cancelled { .. })
    }
}

impl From<serde_yaml::Error> for GeoError {
    fn from(err: serde_yaml::Error) -> Self {
        GeoError::InvalidAreaDefinition {
            area: "<document>".to_string(),
            reason: err.to_string(),
        }
    }
}
