//! Coordinate types, identity keys and R-tree point wrappers.
//! Distances are planar Euclidean in degrees; no great-circle math.
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rstar::{AABB, PointDistance, RTreeObject};

use crate::table::canonical_bits;

pub const LAT: &str = "LAT";
pub const LON: &str = "LON";
pub const YEAR: &str = "YEAR";

pub const BOTTOM_LEFT_LAT: &str = "BOTTOM_LEFT_LAT";
pub const BOTTOM_LEFT_LON: &str = "BOTTOM_LEFT_LON";
pub const UPPER_RIGHT_LAT: &str = "UPPER_RIGHT_LAT";
pub const UPPER_RIGHT_LON: &str = "UPPER_RIGHT_LON";

/// Bounding-box columns of a soil region, in (min_lat, min_lon, max_lat, max_lon) order.
pub const BBOX_COLUMNS: [&str; 4] = [BOTTOM_LEFT_LAT, BOTTOM_LEFT_LON, UPPER_RIGHT_LAT, UPPER_RIGHT_LON];

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn as_array(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// (lat, lon, year) tuple identifying candidate-duplicate records.
///
/// Equality, hashing and ordering go through the canonical bit pattern so that
/// the key is usable in hash maps and sorts; `-0.0` and `0.0` are the same key.
#[derive(Debug, Clone, Copy)]
pub struct IdentityKey {
    pub lat: f64,
    pub lon: f64,
    pub year: f64,
}

impl IdentityKey {
    pub fn new(lat: f64, lon: f64, year: f64) -> Self {
        Self { lat, lon, year }
    }

    fn bits(&self) -> [u64; 3] {
        [canonical_bits(self.lat), canonical_bits(self.lon), canonical_bits(self.year)]
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl Ord for IdentityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Keys are built from parsed, finite values, so canonicalised total order
        // agrees with numeric order.
        let a = (self.lat + 0.0, self.lon + 0.0, self.year + 0.0);
        let b = (other.lat + 0.0, other.lon + 0.0, other.year + 0.0);
        a.0.total_cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    }
}

impl PartialOrd for IdentityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A row's coordinates tagged with its row index, for R-tree queries.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    pub idx: usize,
    pub lat: f64,
    pub lon: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlon = self.lon - point[1];
        dlat * dlat + dlon * dlon
    }
}
