//! Geographic lon/lat "projection": planar coordinates are degrees.

use crate::MapProjection;

#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl MapProjection for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !(lat.abs() <= 90.0) {
            return None;
        }
        Some((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.forward(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(Geographic.forward(-100.0, 35.0), Some((-100.0, 35.0)));
        assert_eq!(Geographic.inverse(190.0, -10.0), Some((190.0, -10.0)));
        assert!(Geographic.inverse(0.0, 91.0).is_none());
    }
}
