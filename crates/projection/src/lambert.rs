//! Lambert Conformal Conic projection (spherical).
//!
//! This projection is commonly used for weather data including HRRR.
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! The projection parameters include:
//! - Origin latitude (lat_0) and central meridian (lon_0, LoV in GRIB2)
//! - Standard parallel(s): lat_1 and optionally lat_2 (omitted for a tangent cone)
//! - False easting/northing: x_0, y_0

use geo_common::{GeoError, GeoResult, ProjectionDescriptor};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::geostationary::normalize_lon;
use crate::MapProjection;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian (LoV) in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// False easting (meters)
    pub x0: f64,
    /// False northing (meters)
    pub y0: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection.
    ///
    /// # Arguments
    /// * `lat0_deg` - Latitude of origin (degrees)
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees); equal to `latin1_deg` for a tangent cone
    /// * `earth_radius` - Sphere radius (meters)
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        earth_radius: f64,
    ) -> GeoResult<Self> {
        for (name, value) in [("lat_0", lat0_deg), ("lat_1", latin1_deg), ("lat_2", latin2_deg)] {
            if value.abs() >= 90.0 {
                return Err(GeoError::invalid_parameter(
                    "lcc",
                    name,
                    format!("latitude {} must lie strictly between the poles", value),
                ));
            }
        }
        if (latin1_deg + latin2_deg).abs() < 1e-10 {
            return Err(GeoError::invalid_parameter(
                "lcc",
                "lat_2",
                "standard parallels symmetric about the equator give a zero cone constant",
            ));
        }
        if !(earth_radius > 0.0) {
            return Err(GeoError::invalid_parameter("lcc", "R", "radius must be positive"));
        }

        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((FRAC_PI_4 + latin2 / 2.0).tan() / (FRAC_PI_4 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        // Compute F constant
        let f = (latin1.cos() * (FRAC_PI_4 + latin1 / 2.0).tan().powf(n)) / n;

        // Compute rho at the latitude of origin
        let rho0 = earth_radius * f / (FRAC_PI_4 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            x0: 0.0,
            y0: 0.0,
            n,
            f,
            rho0,
        })
    }

    /// Build from a descriptor.
    ///
    /// `lat_2` omitted means a tangent cone at `lat_1`. Supplying `lat_2`
    /// equal to `lat_1` is rejected as a degenerate secant definition.
    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeoResult<Self> {
        let lat_1 = desc.require("lat_1")?;
        let lon_0 = desc.require("lon_0")?;
        let lat_2 = match desc.param("lat_2") {
            None => lat_1,
            Some(_) => {
                let lat_2 = desc.require("lat_2")?;
                if lat_2 == lat_1 {
                    return Err(GeoError::invalid_parameter(
                        "lcc",
                        "lat_2",
                        "equals lat_1; omit lat_2 for a tangent cone",
                    ));
                }
                lat_2
            }
        };
        let lat_0 = desc.param_or("lat_0", lat_1)?;
        let radius = desc.param_or("R", 6371229.0)?;

        let mut proj = Self::new(lat_0, lon_0, lat_1, lat_2, radius)?;
        proj.x0 = desc.param_or("x_0", 0.0)?;
        proj.y0 = desc.param_or("y_0", 0.0)?;
        Ok(proj)
    }

    /// HRRR projection: tangent at 38.5°N, LoV 97.5°W.
    pub fn hrrr() -> Self {
        // Constant parameters that the constructor accepts
        match Self::new(38.5, -97.5, 38.5, 38.5, 6371229.0) {
            Ok(proj) => proj,
            Err(_) => unreachable!("HRRR parameters are valid"),
        }
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

impl MapProjection for LambertConformal {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let lat = lat_deg.to_radians();

        // The apex pole has rho = 0; the opposite pole is at infinity
        if (lat + self.n.signum() * FRAC_PI_2).abs() < 1e-12 {
            return None;
        }

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon_deg.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        // Compute rho for this latitude
        let rho = self.earth_radius * self.f / (FRAC_PI_4 + lat / 2.0).tan().powf(self.n);

        // Compute theta (angle from central meridian)
        let theta = self.n * dlon;

        let x = rho * theta.sin() + self.x0;
        let y = self.rho0 - rho * theta.cos() + self.y0;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.x0;
        let dy = self.rho0 - (y - self.y0);
        let sign = self.n.signum();

        // Compute rho and theta from x, y
        let rho = sign * x.hypot(dy);
        if rho == 0.0 {
            return Some((self.lon0.to_degrees(), sign * 90.0));
        }
        let theta = (sign * x).atan2(sign * dy);

        let lat = 2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - FRAC_PI_2;
        let lon = self.lon0 + theta / self.n;

        Some((normalize_lon(lon.to_degrees()), lat.to_degrees()))
    }
}
