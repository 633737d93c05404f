//! Geostationary satellite projection.
//!
//! The satellite views Earth from a fixed position above the equator.
//! Scan angles (radians from nadir) are scaled by the perspective point
//! height so planar coordinates come out in metres, matching the PROJ
//! `geos` convention.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 4

use geo_common::{GeoError, GeoResult, ProjectionDescriptor};
use nalgebra::Vector3;

use crate::MapProjection;

/// Geostationary projection parameters.
#[derive(Debug, Clone)]
pub struct Geostationary {
    /// Satellite distance from Earth centre (metres)
    /// This is perspective_point_height + semi_major_axis
    pub h: f64,
    /// Perspective point height above Earth surface (metres)
    pub perspective_point_height: f64,
    /// Semi-major axis of Earth ellipsoid (metres)
    pub req: f64,
    /// Semi-minor axis of Earth ellipsoid (metres)
    pub rpol: f64,
    /// Longitude of satellite nadir point (radians)
    pub lambda_0: f64,
    /// Sweep angle axis ("x" for GOES-R, "y" for Meteosat/Himawari)
    pub sweep_x: bool,
}

impl Geostationary {
    /// Create a projection from satellite geometry.
    ///
    /// # Arguments
    /// * `perspective_point_height` - Satellite altitude above Earth surface (metres)
    /// * `semi_major_axis` - Earth equatorial radius (metres)
    /// * `semi_minor_axis` - Earth polar radius (metres)
    /// * `longitude_origin_deg` - Satellite longitude (degrees, negative for west)
    /// * `sweep_x` - true for x-axis sweep (GOES-R)
    pub fn new(
        perspective_point_height: f64,
        semi_major_axis: f64,
        semi_minor_axis: f64,
        longitude_origin_deg: f64,
        sweep_x: bool,
    ) -> GeoResult<Self> {
        if !(perspective_point_height > 0.0) {
            return Err(GeoError::invalid_parameter(
                "geos",
                "h",
                format!("perspective height {} must be positive", perspective_point_height),
            ));
        }
        if !(semi_major_axis > 0.0) || !(semi_minor_axis > 0.0) {
            return Err(GeoError::invalid_parameter(
                "geos",
                "a",
                "ellipsoid axes must be positive",
            ));
        }
        if semi_minor_axis > semi_major_axis {
            return Err(GeoError::invalid_parameter(
                "geos",
                "b",
                format!(
                    "semi-minor axis {} exceeds semi-major axis {}",
                    semi_minor_axis, semi_major_axis
                ),
            ));
        }

        Ok(Self {
            h: perspective_point_height + semi_major_axis,
            perspective_point_height,
            req: semi_major_axis,
            rpol: semi_minor_axis,
            lambda_0: longitude_origin_deg.to_radians(),
            sweep_x,
        })
    }

    /// Build from a descriptor (`h`, `lon_0`, optional `a`, `b`, `sweep_x`).
    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeoResult<Self> {
        let h = desc.require("h")?;
        let lon_0 = desc.require("lon_0")?;
        let a = desc.param_or("a", 6378137.0)?;
        let b = desc.param_or("b", 6356752.31414)?;
        let sweep = desc.param_or("sweep_x", 1.0)?;
        if sweep != 0.0 && sweep != 1.0 {
            return Err(GeoError::invalid_parameter(
                "geos",
                "sweep_x",
                "must be 1 (x sweep) or 0 (y sweep)",
            ));
        }
        Self::new(h, a, b, lon_0, sweep == 1.0)
    }

    /// GOES-16 (GOES-East at 75.2°W).
    pub fn goes16() -> Self {
        Self {
            h: 35786023.0 + 6378137.0,
            perspective_point_height: 35786023.0,
            req: 6378137.0,
            rpol: 6356752.31414,
            lambda_0: (-75.2f64).to_radians(),
            sweep_x: true,
        }
    }

    /// Unit viewing direction for a pair of scan angles, in the
    /// satellite frame (x toward Earth centre, z north).
    #[inline]
    fn scan_direction(&self, x_rad: f64, y_rad: f64) -> Vector3<f64> {
        let (sin_x, cos_x) = x_rad.sin_cos();
        let (sin_y, cos_y) = y_rad.sin_cos();
        if self.sweep_x {
            Vector3::new(cos_x * cos_y, -sin_x, cos_x * sin_y)
        } else {
            Vector3::new(cos_x * cos_y, -sin_x * cos_y, sin_y)
        }
    }

    /// Convert scan angles (radians) to geographic coordinates (lon/lat degrees).
    ///
    /// Based on GOES-R PUG Volume 4, Section 4.2.8.
    /// Returns None if the scan angle points to space (off Earth).
    pub fn scan_to_geo(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        let d = self.scan_direction(x_rad, y_rad);
        let k = (self.req / self.rpol).powi(2);

        // Quadratic coefficients for finding distance to Earth surface
        let a = d.x * d.x + d.y * d.y + k * d.z * d.z;
        let b = -2.0 * self.h * d.x;
        let c = self.h * self.h - self.req * self.req;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None; // Scan angle points to space
        }

        let rs = (-b - discriminant.sqrt()) / (2.0 * a);
        let s = d * rs;

        // Convert to geodetic coordinates
        let lat = (k * s.z / (self.h - s.x).hypot(s.y)).atan();
        let lon = self.lambda_0 - s.y.atan2(self.h - s.x);

        Some((normalize_lon(lon.to_degrees()), lat.to_degrees()))
    }

    /// Convert geographic coordinates (lon/lat degrees) to scan angles (radians).
    ///
    /// Based on GOES-R PUG Volume 4, Section 4.2.8.
    /// Returns None if the point is not visible from the satellite.
    pub fn geo_to_scan(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let lat_rad = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.lambda_0;

        // Geocentric latitude (accounting for Earth's oblateness)
        let phi_c = ((self.rpol / self.req).powi(2) * lat_rad.tan()).atan();

        // Eccentricity squared
        let e2 = 1.0 - (self.rpol / self.req).powi(2);

        // Radius from Earth center to surface point
        let rc = self.rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        // Satellite-to-point vector
        let s = Vector3::new(
            self.h - rc * phi_c.cos() * dlon.cos(),
            -rc * phi_c.cos() * dlon.sin(),
            rc * phi_c.sin(),
        );

        // Visibility: the point must face the satellite
        // (PUG: H * (H - sx) >= sy^2 + (req/rpol)^2 * sz^2)
        let k = (self.req / self.rpol).powi(2);
        if self.h * (self.h - s.x) < s.y * s.y + k * s.z * s.z {
            return None;
        }

        let norm = s.norm();
        let (x_rad, y_rad) = if self.sweep_x {
            ((-s.y / norm).asin(), s.z.atan2(s.x))
        } else {
            ((-s.y).atan2(s.x), (s.z / norm).asin())
        };

        Some((x_rad, y_rad))
    }
}

impl MapProjection for Geostationary {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (x, y) = self.geo_to_scan(lon, lat)?;
        Some((
            x * self.perspective_point_height,
            y * self.perspective_point_height,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.scan_to_geo(
            x / self.perspective_point_height,
            y / self.perspective_point_height,
        )
    }
}

/// Wrap a longitude into [-180, 180).
#[inline]
pub(crate) fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can land exactly on 360 through rounding
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meteosat() -> Geostationary {
        Geostationary::new(35785831.0, 6378169.0, 6356583.8, 0.0, false).unwrap()
    }

    #[test]
    fn test_nadir() {
        let proj = Geostationary::goes16();

        let (lon, lat) = proj.scan_to_geo(0.0, 0.0).unwrap();
        assert!((lon - (-75.2)).abs() < 1e-9, "Nadir longitude should be -75.2, got {}", lon);
        assert!(lat.abs() < 1e-9, "Nadir latitude should be 0, got {}", lat);

        let (x, y) = proj.geo_to_scan(-75.2, 0.0).unwrap();
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn test_goes_roundtrip_conus() {
        let proj = Geostationary::goes16();

        for (lon, lat) in [(-95.0, 39.0), (-120.0, 45.0), (-70.0, 20.0), (-60.0, -30.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_y_sweep_roundtrip() {
        let proj = meteosat();

        for (lon, lat) in [(10.0, 50.0), (-20.0, -35.0), (40.0, 10.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_sweeps_differ_off_axis() {
        let x_sweep = Geostationary::new(35785831.0, 6378169.0, 6356583.8, 0.0, true).unwrap();
        let y_sweep = meteosat();

        let a = x_sweep.forward(30.0, 40.0).unwrap();
        let b = y_sweep.forward(30.0, 40.0).unwrap();
        assert!((a.0 - b.0).abs() > 1.0 || (a.1 - b.1).abs() > 1.0);
    }

    #[test]
    fn test_off_earth() {
        let proj = Geostationary::goes16();
        // ~28 degrees from nadir points into space
        assert!(proj.scan_to_geo(0.5, 0.5).is_none());
    }

    #[test]
    fn test_not_visible() {
        let proj = Geostationary::goes16();
        // Opposite side of the Earth from GOES-16
        assert!(proj.geo_to_scan(105.0, 0.0).is_none());
        assert!(proj.forward(180.0, 0.0).is_none());
    }

    #[test]
    fn test_invalid_parameters() {
        let err = Geostationary::new(-1.0, 6378137.0, 6356752.0, 0.0, true).unwrap_err();
        assert!(matches!(err, GeoError::InvalidProjectionParameters { .. }));

        let err = Geostationary::new(35786023.0, 6356752.0, 6378137.0, 0.0, true).unwrap_err();
        assert!(matches!(err, GeoError::InvalidProjectionParameters { ref param, .. } if param == "b"));

        let desc = ProjectionDescriptor::goes_east().with_param("sweep_x", 0.5);
        assert!(Geostationary::from_descriptor(&desc).is_err());
    }

    #[test]
    fn test_normalize_lon() {
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(180.0), -180.0);
        assert_eq!(normalize_lon(-75.0), -75.0);
    }
}
