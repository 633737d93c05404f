//! Configuration for the resampling engine.

use geo_common::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};

use crate::types::ResampleMethod;

/// Configuration for resampling, cropping and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Nearest-neighbour search radius for swath sources, in metres.
    /// A candidate must be strictly closer than this to be used.
    pub radius_of_influence: f64,

    /// Output rows per tile.
    pub tile_rows: usize,

    /// Output columns per tile.
    pub tile_cols: usize,

    /// Process tiles on the rayon thread pool.
    pub parallel: bool,

    /// Interior points sampled along each grid or bbox edge when
    /// tracing outlines through a projection.
    pub edge_samples: usize,

    /// Use only the outer ring of swath pixels when resolving a dynamic grid.
    pub swath_boundary_only: bool,

    /// Method used when a request does not name one.
    pub default_method: ResampleMethod,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            radius_of_influence: 50_000.0,
            tile_rows: 256,
            tile_cols: 256,
            parallel: true,
            edge_samples: 20,
            swath_boundary_only: false,
            default_method: ResampleMethod::Nearest,
        }
    }
}

impl ResampleConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RESAMPLE_RADIUS_OF_INFLUENCE") {
            if let Ok(radius) = val.parse() {
                config.radius_of_influence = radius;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_TILE_ROWS") {
            if let Ok(rows) = val.parse() {
                config.tile_rows = rows;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_TILE_COLS") {
            if let Ok(cols) = val.parse() {
                config.tile_cols = cols;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_PARALLEL") {
            config.parallel = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("RESAMPLE_EDGE_SAMPLES") {
            if let Ok(samples) = val.parse() {
                config.edge_samples = samples;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_SWATH_BOUNDARY_ONLY") {
            config.swath_boundary_only = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("RESAMPLE_METHOD") {
            if let Ok(method) = val.parse() {
                config.default_method = method;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GeoResult<()> {
        if !self.radius_of_influence.is_finite() || self.radius_of_influence < 0.0 {
            return Err(GeoError::InvalidConfig(format!(
                "radius_of_influence must be a finite value >= 0, got {}",
                self.radius_of_influence
            )));
        }

        if self.tile_rows == 0 || self.tile_cols == 0 {
            return Err(GeoError::InvalidConfig(
                "tile_rows and tile_cols must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResampleConfig::default();
        assert_eq!(config.radius_of_influence, 50_000.0);
        assert_eq!(config.tile_rows, 256);
        assert_eq!(config.tile_cols, 256);
        assert!(config.parallel);
        assert!(!config.swath_boundary_only);
        assert_eq!(config.default_method, ResampleMethod::Nearest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ResampleConfig::default();
        config.tile_rows = 0;
        assert!(matches!(config.validate(), Err(GeoError::InvalidConfig(_))));

        config = ResampleConfig::default();
        config.radius_of_influence = -1.0;
        assert!(config.validate().is_err());

        config.radius_of_influence = f64::NAN;
        assert!(config.validate().is_err());

        // Zero radius is legal: nothing ever matches
        config.radius_of_influence = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("RESAMPLE_RADIUS_OF_INFLUENCE", "12500");
        std::env::set_var("RESAMPLE_TILE_ROWS", "64");
        std::env::set_var("RESAMPLE_PARALLEL", "false");
        std::env::set_var("RESAMPLE_METHOD", "BILINEAR");
        std::env::set_var("RESAMPLE_TILE_COLS", "not-a-number");

        let config = ResampleConfig::from_env();

        std::env::remove_var("RESAMPLE_RADIUS_OF_INFLUENCE");
        std::env::remove_var("RESAMPLE_TILE_ROWS");
        std::env::remove_var("RESAMPLE_PARALLEL");
        std::env::remove_var("RESAMPLE_METHOD");
        std::env::remove_var("RESAMPLE_TILE_COLS");

        assert_eq!(config.radius_of_influence, 12500.0);
        assert_eq!(config.tile_rows, 64);
        assert_eq!(config.tile_cols, 256);
        assert!(!config.parallel);
        assert_eq!(config.default_method, ResampleMethod::Bilinear);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ResampleConfig =
            serde_json::from_str(r#"{"radius_of_influence": 5000.0, "tile_cols": 32}"#).unwrap();
        assert_eq!(config.radius_of_influence, 5000.0);
        assert_eq!(config.tile_cols, 32);
        assert_eq!(config.tile_rows, 256);
    }
}
