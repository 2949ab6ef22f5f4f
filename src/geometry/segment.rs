use std::hash::{Hash, Hasher};

use crate::math::{Point3, VertexKey};

/// An undirected edge between two points.
///
/// Endpoints are stored in a canonical order, so `Segment::new(a, b)` and
/// `Segment::new(b, a)` are equal and hash identically.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    points: [Point3; 2],
    keys: [VertexKey; 2],
}

impl Segment {
    /// Creates a segment between two points.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        let (ka, kb) = (VertexKey::new(&a), VertexKey::new(&b));
        if ka <= kb {
            Self {
                points: [a, b],
                keys: [ka, kb],
            }
        } else {
            Self {
                points: [b, a],
                keys: [kb, ka],
            }
        }
    }

    /// Returns both endpoints in canonical order.
    #[must_use]
    pub fn points(&self) -> &[Point3; 2] {
        &self.points
    }

    /// Returns the keys of both endpoints in canonical order.
    #[must_use]
    pub fn keys(&self) -> &[VertexKey; 2] {
        &self.keys
    }

    /// Returns the midpoint.
    #[must_use]
    pub fn mid(&self) -> Point3 {
        nalgebra::center(&self.points[0], &self.points[1])
    }

    /// Returns the length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.points[1] - self.points[0]).norm()
    }

    /// Returns `true` if `key` is one of the endpoints.
    #[must_use]
    pub fn has_endpoint(&self, key: VertexKey) -> bool {
        self.keys[0] == key || self.keys[1] == key
    }

    /// Returns `true` if the two segments share an endpoint.
    #[must_use]
    pub fn touches(&self, other: &Segment) -> bool {
        other.has_endpoint(self.keys[0]) || other.has_endpoint(self.keys[1])
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.keys.hash(state);
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.keys.cmp(&other.keys)
    }
}
