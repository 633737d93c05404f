//! Spherical Mercator projection.
//!
//! With the defaults (`lon_0 = 0`, `lat_ts = 0`, `R = 6378137`) this is the
//! Web Mercator plane used by EPSG:3857 tiles.

use geo_common::{GeoError, GeoResult, ProjectionDescriptor};
use std::f64::consts::FRAC_PI_4;

use crate::geostationary::normalize_lon;
use crate::MapProjection;

/// Spherical Mercator parameters.
#[derive(Debug, Clone)]
pub struct Mercator {
    /// Central meridian (radians)
    pub lon0: f64,
    /// Sphere radius scaled by cos(lat_ts) (metres)
    scaled_radius: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Mercator {
    pub fn new(lon0_deg: f64, lat_ts_deg: f64, radius: f64) -> GeoResult<Self> {
        if !(radius > 0.0) {
            return Err(GeoError::invalid_parameter("merc", "R", "radius must be positive"));
        }
        if lat_ts_deg.abs() >= 90.0 {
            return Err(GeoError::invalid_parameter(
                "merc",
                "lat_ts",
                format!("true-scale latitude {} must lie strictly between the poles", lat_ts_deg),
            ));
        }

        Ok(Self {
            lon0: lon0_deg.to_radians(),
            scaled_radius: radius * lat_ts_deg.to_radians().cos(),
            x0: 0.0,
            y0: 0.0,
        })
    }

    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeoResult<Self> {
        let mut proj = Self::new(
            desc.param_or("lon_0", 0.0)?,
            desc.param_or("lat_ts", 0.0)?,
            desc.param_or("R", 6378137.0)?,
        )?;
        proj.x0 = desc.param_or("x_0", 0.0)?;
        proj.y0 = desc.param_or("y_0", 0.0)?;
        Ok(proj)
    }

    /// EPSG:3857.
    pub fn web_mercator() -> Self {
        Self {
            lon0: 0.0,
            scaled_radius: 6378137.0,
            x0: 0.0,
            y0: 0.0,
        }
    }
}

impl MapProjection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        // The poles map to infinity
        if !(lat.abs() < 90.0) {
            return None;
        }
        let dlon = normalize_lon(lon - self.lon0.to_degrees()).to_radians();
        let x = self.scaled_radius * dlon + self.x0;
        let y = self.scaled_radius * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let lon = (x - self.x0) / self.scaled_radius + self.lon0;
        let lat = ((y - self.y0) / self.scaled_radius).sinh().atan();
        Some((normalize_lon(lon.to_degrees()), lat.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_mercator_known_points() {
        let proj = Mercator::web_mercator();

        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);

        // Edge of the square Web Mercator world
        let (x, _) = proj.forward(180.0 - 1e-12, 0.0).unwrap();
        assert!((x - 20037508.342789244).abs() < 1e-3, "x = {}", x);
        let (_, y) = proj.forward(0.0, 85.0511287798066).unwrap();
        assert!((y - 20037508.342789244).abs() < 1e-2, "y = {}", y);
    }

    #[test]
    fn test_roundtrip_with_true_scale() {
        let desc = ProjectionDescriptor::new(geo_common::ProjectionFamily::Mercator)
            .with_param("lon_0", 100.0)
            .with_param("lat_ts", 20.0)
            .with_param("y_0", 1000.0);
        let proj = Mercator::from_descriptor(&desc).unwrap();

        for (lon, lat) in [(100.0, 0.0), (120.0, -40.0), (-170.0, 70.0), (80.0, 84.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_poles_have_no_image() {
        let proj = Mercator::web_mercator();
        assert!(proj.forward(0.0, 90.0).is_none());
        assert!(proj.forward(0.0, -90.0).is_none());
    }

    #[test]
    fn test_invalid_radius() {
        let desc = ProjectionDescriptor::web_mercator().with_param("R", 0.0);
        assert!(matches!(
            Mercator::from_descriptor(&desc),
            Err(GeoError::InvalidProjectionParameters { .. })
        ));
    }
}
