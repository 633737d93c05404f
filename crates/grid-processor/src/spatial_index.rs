//! R-tree over swath pixel positions.
//!
//! Pixels are indexed by their earth-centred (ECEF) coordinates on the
//! WGS84 ellipsoid, so distances are straight-line chords in metres and
//! the antimeridian and poles need no special handling.

use geo_common::SwathGeometry;
use projection::geodetic_to_ecef;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone)]
struct SwathEntry {
    position: [f64; 3],
    index: usize,
}

impl RTreeObject for SwathEntry {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for SwathEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Nearest-neighbour index over the geolocated pixels of a swath.
///
/// Built once, read-only afterwards; safe to share between tile workers and
/// across requests on the same swath.
pub struct SwathIndex {
    tree: RTree<SwathEntry>,
    shape: (usize, usize),
}

impl SwathIndex {
    /// Bulk-load every pixel with finite lon/lat.
    pub fn build(swath: &SwathGeometry) -> Self {
        let entries: Vec<SwathEntry> = swath
            .longitudes()
            .iter()
            .zip(swath.latitudes())
            .enumerate()
            .filter(|(_, (lon, lat))| lon.is_finite() && lat.is_finite() && lat.abs() <= 90.0)
            .map(|(index, (&lon, &lat))| {
                let p = geodetic_to_ecef(lon, lat);
                SwathEntry {
                    position: [p.x, p.y, p.z],
                    index,
                }
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            shape: swath.shape(),
        }
    }

    /// Shape of the swath the index was built from.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Number of indexed (geolocated) pixels.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Flat index of the nearest pixel strictly within `radius` metres of
    /// `lon, lat`.
    ///
    /// Equidistant candidates resolve to the lowest flat index.
    pub fn nearest_within(&self, lon: f64, lat: f64, radius: f64) -> Option<usize> {
        if !(radius > 0.0) || !lon.is_finite() || !(lat.abs() <= 90.0) {
            return None;
        }
        let q = geodetic_to_ecef(lon, lat);
        let query = [q.x, q.y, q.z];
        let radius_2 = radius * radius;

        let mut best: Option<(usize, f64)> = None;
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            if d2 >= radius_2 {
                break;
            }
            match best {
                None => best = Some((entry.index, d2)),
                Some((index, best_d2)) => {
                    if d2 > best_d2 {
                        break;
                    }
                    if entry.index < index {
                        best = Some((entry.index, d2));
                    }
                }
            }
        }
        best.map(|(index, _)| index)
    }

    /// Chord distance in metres between two lon/lat points.
    pub fn chord_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        (geodetic_to_ecef(a.0, a.1) - geodetic_to_ecef(b.0, b.1)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_swath() -> SwathGeometry {
        // One row, pixels every 0.1 degree along the equator
        let lons: Vec<f64> = (0..10).map(|i| i as f64 * 0.1).collect();
        SwathGeometry::new(lons, vec![0.0; 10], 1, 10).unwrap()
    }

    #[test]
    fn test_nearest_within_radius() {
        let index = SwathIndex::build(&line_swath());
        assert_eq!(index.len(), 10);
        assert_eq!(index.nearest_within(0.31, 0.0, 20_000.0), Some(3));
        // ~1.1 km from pixel 3 but radius is 1 km
        assert_eq!(index.nearest_within(0.31, 0.0, 1_000.0), None);
    }

    #[test]
    fn test_zero_radius_never_matches() {
        let index = SwathIndex::build(&line_swath());
        assert_eq!(index.nearest_within(0.0, 0.0, 0.0), None);
    }

    #[test]
    fn test_ties_pick_lowest_index() {
        // Two pixels at the same place
        let swath = SwathGeometry::new(vec![5.0, 5.0, 6.0], vec![1.0, 1.0, 1.0], 1, 3).unwrap();
        let index = SwathIndex::build(&swath);
        assert_eq!(index.nearest_within(5.0, 1.0, 10.0), Some(0));
    }

    #[test]
    fn test_missing_geolocation_skipped() {
        let swath =
            SwathGeometry::new(vec![f64::NAN, 10.0], vec![0.0, 0.0], 1, 2).unwrap();
        let index = SwathIndex::build(&swath);
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest_within(0.0, 0.0, 2_000_000.0), Some(1));
    }

    #[test]
    fn test_antimeridian_neighbours() {
        let swath = SwathGeometry::new(vec![179.99, -170.0], vec![0.0, 0.0], 1, 2).unwrap();
        let index = SwathIndex::build(&swath);
        assert_eq!(index.nearest_within(-179.99, 0.0, 5_000.0), Some(0));
    }

    #[test]
    fn test_chord_distance() {
        // One degree of longitude at the equator is ~111.3 km
        let d = SwathIndex::chord_distance((0.0, 0.0), (1.0, 0.0));
        assert!((d - 111_319.0).abs() < 10.0, "d = {}", d);
    }
}
