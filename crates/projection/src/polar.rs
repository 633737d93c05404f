//! Polar stereographic projection (spherical).
//!
//! The projection plane touches (or cuts) the sphere around one pole.
//! `lat_ts` sets the latitude of true scale; the opposite pole has no image.

use geo_common::{GeoError, GeoResult, ProjectionDescriptor};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::geostationary::normalize_lon;
use crate::MapProjection;

#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// true for the north polar aspect
    pub north: bool,
    /// Straight vertical longitude (radians)
    pub lon0: f64,
    /// R * (1 + sin|lat_ts|)
    scale: f64,
    pub x0: f64,
    pub y0: f64,
}

impl PolarStereographic {
    /// # Arguments
    /// * `lat0_deg` - 90 or -90
    /// * `lon0_deg` - Straight vertical longitude
    /// * `lat_ts_deg` - Latitude of true scale, same hemisphere as the pole
    /// * `radius` - Sphere radius (metres)
    pub fn new(lat0_deg: f64, lon0_deg: f64, lat_ts_deg: f64, radius: f64) -> GeoResult<Self> {
        if lat0_deg.abs() != 90.0 {
            return Err(GeoError::invalid_parameter(
                "stere",
                "lat_0",
                format!("polar aspect needs lat_0 = ±90, got {}", lat0_deg),
            ));
        }
        let north = lat0_deg > 0.0;
        if lat_ts_deg.abs() > 90.0 || (lat_ts_deg != 0.0 && (lat_ts_deg > 0.0) != north) {
            let hemisphere = if north { "northern" } else { "southern" };
            return Err(GeoError::invalid_parameter(
                "stere",
                "lat_ts",
                format!(
                    "true-scale latitude {} is not in the {} hemisphere",
                    lat_ts_deg, hemisphere
                ),
            ));
        }
        if !(radius > 0.0) {
            return Err(GeoError::invalid_parameter("stere", "R", "radius must be positive"));
        }

        Ok(Self {
            north,
            lon0: lon0_deg.to_radians(),
            scale: radius * (1.0 + lat_ts_deg.to_radians().abs().sin()),
            x0: 0.0,
            y0: 0.0,
        })
    }

    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeoResult<Self> {
        let lat_0 = desc.require("lat_0")?;
        let mut proj = Self::new(
            lat_0,
            desc.param_or("lon_0", 0.0)?,
            desc.param_or("lat_ts", lat_0)?,
            desc.param_or("R", 6371229.0)?,
        )?;
        proj.x0 = desc.param_or("x_0", 0.0)?;
        proj.y0 = desc.param_or("y_0", 0.0)?;
        Ok(proj)
    }
}

impl MapProjection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(lat.abs() <= 90.0) {
            return None;
        }
        // Work in the north aspect; the south aspect mirrors latitude and y
        let phi = if self.north { lat } else { -lat }.to_radians();
        if (phi + FRAC_PI_2).abs() < 1e-12 {
            return None; // opposite pole
        }

        let dlon = lon.to_radians() - self.lon0;
        let rho = self.scale * (FRAC_PI_4 - phi / 2.0).tan();
        let x = rho * dlon.sin();
        let y = if self.north {
            -rho * dlon.cos()
        } else {
            rho * dlon.cos()
        };
        Some((x + self.x0, y + self.y0))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let x = x - self.x0;
        let y = y - self.y0;
        let rho = x.hypot(y);
        let pole = if self.north { 90.0 } else { -90.0 };
        if rho == 0.0 {
            return Some((normalize_lon(self.lon0.to_degrees()), pole));
        }

        let phi = FRAC_PI_2 - 2.0 * (rho / self.scale).atan();
        let (lat, lambda) = if self.north {
            (phi, self.lon0 + x.atan2(-y))
        } else {
            (-phi, self.lon0 + x.atan2(y))
        };
        Some((normalize_lon(lambda.to_degrees()), lat.to_degrees()))
    }
}
