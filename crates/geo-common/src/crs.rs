//! Projection descriptors: a projection family plus its parameter mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{GeoError, GeoResult};

/// Projection families understood by the projection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionFamily {
    /// Geographic longitude/latitude in degrees (plate carrée)
    LonLat,
    /// Geostationary satellite view (GOES, Meteosat, Himawari)
    Geostationary,
    /// Lambert Conformal Conic
    LambertConformalConic,
    /// Mercator
    Mercator,
    /// Polar Stereographic (north or south)
    PolarStereographic,
}

impl ProjectionFamily {
    /// Parse a family name. Accepts the PROJ short names as well.
    ///
    /// - "lonlat", "latlong", "longlat", "eqc"
    /// - "geos", "geostationary"
    /// - "lcc", "lambert_conformal_conic"
    /// - "merc", "mercator"
    /// - "stere", "polar_stereographic"
    pub fn parse(s: &str) -> GeoResult<Self> {
        match s.to_lowercase().as_str() {
            "lonlat" | "latlong" | "longlat" | "latlon" | "eqc" => Ok(Self::LonLat),
            "geos" | "geostationary" => Ok(Self::Geostationary),
            "lcc" | "lambert_conformal_conic" => Ok(Self::LambertConformalConic),
            "merc" | "mercator" => Ok(Self::Mercator),
            "stere" | "polar_stereographic" => Ok(Self::PolarStereographic),
            _ => Err(GeoError::invalid_parameter(s, "proj", "unknown projection family")),
        }
    }

    /// PROJ-style short name.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::LonLat => "lonlat",
            Self::Geostationary => "geos",
            Self::LambertConformalConic => "lcc",
            Self::Mercator => "merc",
            Self::PolarStereographic => "stere",
        }
    }

    /// Check if this family works directly in degrees.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::LonLat)
    }
}

impl fmt::Display for ProjectionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Full projection definition with its numeric parameters.
///
/// Angles are degrees, distances metres. Parameter names follow PROJ
/// (`lon_0`, `lat_1`, `h`, `R`, ...). Equality is by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    pub family: ProjectionFamily,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl ProjectionDescriptor {
    pub fn new(family: ProjectionFamily) -> Self {
        Self {
            family,
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter.
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Look up a parameter.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }

    /// Look up a required parameter; missing or non-finite values fail.
    pub fn require(&self, name: &str) -> GeoResult<f64> {
        match self.param(name) {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(GeoError::invalid_parameter(
                self.family.short_name(),
                name,
                format!("value {} is not finite", v),
            )),
            None => Err(GeoError::invalid_parameter(
                self.family.short_name(),
                name,
                "required parameter is missing",
            )),
        }
    }

    /// Look up an optional parameter with a default.
    pub fn param_or(&self, name: &str, default: f64) -> GeoResult<f64> {
        match self.param(name) {
            None => Ok(default),
            Some(_) => self.require(name),
        }
    }

    /// Geographic lon/lat.
    pub fn lonlat() -> Self {
        Self::new(ProjectionFamily::LonLat)
    }

    /// GOES-East full-disk view (75.2°W).
    pub fn goes_east() -> Self {
        Self::new(ProjectionFamily::Geostationary)
            .with_param("h", 35786023.0)
            .with_param("lon_0", -75.2)
            .with_param("a", 6378137.0)
            .with_param("b", 6356752.31414)
            .with_param("sweep_x", 1.0)
    }

    /// Meteosat 0° service (y-axis sweep).
    pub fn meteosat_0deg() -> Self {
        Self::new(ProjectionFamily::Geostationary)
            .with_param("h", 35785831.0)
            .with_param("lon_0", 0.0)
            .with_param("a", 6378169.0)
            .with_param("b", 6356583.8)
            .with_param("sweep_x", 0.0)
    }

    /// HRRR-style Lambert Conformal (tangent at 38.5°N, LoV 97.5°W).
    pub fn hrrr_lcc() -> Self {
        Self::new(ProjectionFamily::LambertConformalConic)
            .with_param("lat_1", 38.5)
            .with_param("lat_0", 38.5)
            .with_param("lon_0", -97.5)
            .with_param("R", 6371229.0)
    }

    /// Spherical Web Mercator.
    pub fn web_mercator() -> Self {
        Self::new(ProjectionFamily::Mercator)
            .with_param("lon_0", 0.0)
            .with_param("R", 6378137.0)
    }

    /// Descriptor for a well-known EPSG code.
    ///
    /// Only the codes that map onto a supported family are accepted; polar
    /// stereographic codes use the spherical approximation.
    pub fn from_epsg(code: u32) -> GeoResult<Self> {
        match code {
            4326 => Ok(Self::lonlat()),
            3857 | 900913 => Ok(Self::web_mercator()),
            3413 => Ok(Self::new(ProjectionFamily::PolarStereographic)
                .with_param("lat_0", 90.0)
                .with_param("lat_ts", 70.0)
                .with_param("lon_0", -45.0)),
            3031 => Ok(Self::new(ProjectionFamily::PolarStereographic)
                .with_param("lat_0", -90.0)
                .with_param("lat_ts", -71.0)
                .with_param("lon_0", 0.0)),
            _ => Err(GeoError::invalid_parameter(
                "epsg",
                "code",
                format!("EPSG:{} is not supported", code),
            )),
        }
    }
}

impl fmt::Display for ProjectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+proj={}", self.family)?;
        for (name, value) in &self.params {
            write!(f, " +{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family() {
        assert_eq!(
            ProjectionFamily::parse("GEOS").unwrap(),
            ProjectionFamily::Geostationary
        );
        assert_eq!(
            ProjectionFamily::parse("lcc").unwrap(),
            ProjectionFamily::LambertConformalConic
        );
        assert_eq!(
            ProjectionFamily::parse("latlong").unwrap(),
            ProjectionFamily::LonLat
        );
        assert!(ProjectionFamily::parse("utm").is_err());
    }

    #[test]
    fn test_require_missing_param() {
        let desc = ProjectionDescriptor::new(ProjectionFamily::Geostationary);
        let err = desc.require("h").unwrap_err();
        match err {
            GeoError::InvalidProjectionParameters { family, param, .. } => {
                assert_eq!(family, "geos");
                assert_eq!(param, "h");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_param_or_rejects_nan() {
        let desc = ProjectionDescriptor::web_mercator().with_param("lat_ts", f64::NAN);
        assert!(desc.param_or("lat_ts", 0.0).is_err());
        assert_eq!(desc.param_or("x_0", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_descriptor_display() {
        let desc = ProjectionDescriptor::lonlat();
        assert_eq!(desc.to_string(), "+proj=lonlat");

        let desc = ProjectionDescriptor::web_mercator();
        assert_eq!(desc.to_string(), "+proj=merc +R=6378137 +lon_0=0");
    }

    #[test]
    fn test_from_epsg() {
        assert_eq!(
            ProjectionDescriptor::from_epsg(4326).unwrap(),
            ProjectionDescriptor::lonlat()
        );
        assert_eq!(
            ProjectionDescriptor::from_epsg(3413).unwrap().family,
            ProjectionFamily::PolarStereographic
        );
        assert!(ProjectionDescriptor::from_epsg(99999).is_err());
    }
}
