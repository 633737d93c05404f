//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! Angles are degrees at the public boundary; planar coordinates are metres
//! (degrees for geographic lon/lat).

pub mod geographic;
pub mod geostationary;
pub mod lambert;
pub mod mercator;
pub mod polar;
pub mod transform;

pub use geographic::Geographic;
pub use geostationary::Geostationary;
pub use lambert::LambertConformal;
pub use mercator::Mercator;
pub use polar::PolarStereographic;
pub use transform::{geodetic_to_ecef, Projection, Transformer};

/// A forward/inverse map projection.
///
/// Both directions return `None` for points without an image (behind the
/// limb, at a pole mapped to infinity, ...).
pub trait MapProjection: Send + Sync {
    /// lon/lat degrees → planar x/y.
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Planar x/y → lon/lat degrees.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}
