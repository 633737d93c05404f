//! Descriptor-driven projection dispatch and coordinate transforms.

use geo_common::{GeoError, GeoResult, ProjectionDescriptor, ProjectionFamily};
use nalgebra::Vector3;

use crate::geographic::Geographic;
use crate::geostationary::Geostationary;
use crate::lambert::LambertConformal;
use crate::mercator::Mercator;
use crate::polar::PolarStereographic;
use crate::MapProjection;

/// WGS84 semi-major axis (metres).
pub const WGS84_A: f64 = 6378137.0;
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = 6.694379990141317e-3;

#[derive(Debug, Clone)]
enum Kind {
    Geographic(Geographic),
    Geostationary(Geostationary),
    Lambert(LambertConformal),
    Mercator(Mercator),
    Polar(PolarStereographic),
}

/// A validated projection built from a [`ProjectionDescriptor`].
#[derive(Debug, Clone)]
pub struct Projection {
    descriptor: ProjectionDescriptor,
    kind: Kind,
}

impl Projection {
    /// Validate the descriptor's parameters and build the projection.
    pub fn from_descriptor(descriptor: &ProjectionDescriptor) -> GeoResult<Self> {
        let kind = match descriptor.family {
            ProjectionFamily::LonLat => Kind::Geographic(Geographic),
            ProjectionFamily::Geostationary => {
                Kind::Geostationary(Geostationary::from_descriptor(descriptor)?)
            }
            ProjectionFamily::LambertConformalConic => {
                Kind::Lambert(LambertConformal::from_descriptor(descriptor)?)
            }
            ProjectionFamily::Mercator => Kind::Mercator(Mercator::from_descriptor(descriptor)?),
            ProjectionFamily::PolarStereographic => {
                Kind::Polar(PolarStereographic::from_descriptor(descriptor)?)
            }
        };

        Ok(Self {
            descriptor: descriptor.clone(),
            kind,
        })
    }

    pub fn descriptor(&self) -> &ProjectionDescriptor {
        &self.descriptor
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self.kind, Kind::Geographic(_))
    }

    #[inline]
    fn inner(&self) -> &dyn MapProjection {
        match &self.kind {
            Kind::Geographic(p) => p,
            Kind::Geostationary(p) => p,
            Kind::Lambert(p) => p,
            Kind::Mercator(p) => p,
            Kind::Polar(p) => p,
        }
    }

    /// lon/lat degrees → planar coordinates, `None` when the point has no image.
    #[inline]
    pub fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        self.inner()
            .forward(lon, lat)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }

    /// Planar coordinates → lon/lat degrees, `None` off the earth.
    #[inline]
    pub fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.inner()
            .inverse(x, y)
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
    }

    /// Elementwise [`Projection::project`].
    pub fn project_slice(&self, lons: &[f64], lats: &[f64]) -> GeoResult<Vec<Option<(f64, f64)>>> {
        check_pair_lengths(lons, lats)?;
        Ok(lons
            .iter()
            .zip(lats)
            .map(|(&lon, &lat)| self.project(lon, lat))
            .collect())
    }

    /// Elementwise [`Projection::unproject`].
    pub fn unproject_slice(&self, xs: &[f64], ys: &[f64]) -> GeoResult<Vec<Option<(f64, f64)>>> {
        check_pair_lengths(xs, ys)?;
        Ok(xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| self.unproject(x, y))
            .collect())
    }
}

fn check_pair_lengths(a: &[f64], b: &[f64]) -> GeoResult<()> {
    if a.len() != b.len() {
        return Err(GeoError::shape_mismatch(
            "coordinate arrays",
            (1, a.len()),
            (1, b.len()),
        ));
    }
    Ok(())
}

/// Maps planar coordinates of one projection into another via lon/lat.
#[derive(Debug, Clone)]
pub struct Transformer {
    source: Projection,
    target: Projection,
    identity: bool,
}

impl Transformer {
    pub fn new(source: &ProjectionDescriptor, target: &ProjectionDescriptor) -> GeoResult<Self> {
        Ok(Self {
            source: Projection::from_descriptor(source)?,
            target: Projection::from_descriptor(target)?,
            identity: source == target,
        })
    }

    pub fn source(&self) -> &Projection {
        &self.source
    }

    pub fn target(&self) -> &Projection {
        &self.target
    }

    /// Source planar → target planar, `None` if either step has no image.
    #[inline]
    pub fn transform(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.identity {
            return (x.is_finite() && y.is_finite()).then_some((x, y));
        }
        let (lon, lat) = self.source.unproject(x, y)?;
        self.target.project(lon, lat)
    }
}

/// Geodetic lon/lat (degrees) on WGS84 to earth-centred earth-fixed metres.
#[inline]
pub fn geodetic_to_ecef(lon: f64, lat: f64) -> Vector3<f64> {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    // Prime vertical radius of curvature
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        n * cos_lat * cos_lon,
        n * cos_lat * sin_lon,
        n * (1.0 - WGS84_E2) * sin_lat,
    )
}
