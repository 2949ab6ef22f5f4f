use crate::geometry::{Collider, Ray};
use crate::math::{Point3, Vector3};

use super::{in_bounds, Solid};

/// A solid whose interior is defined by a closed collider surface.
///
/// Membership uses ray parity: a point is inside when a ray cast from it
/// crosses the surface an odd number of times.
#[derive(Debug, Clone)]
pub struct ColliderSolid<C> {
    collider: C,
}

impl<C: Collider> ColliderSolid<C> {
    /// Probe direction, kept off the lattice axes and diagonals.
    const PROBE: [f64; 3] = [
        0.522_489_270_860_362_6,
        0.104_944_772_432_145_1,
        0.846_149_385_123_456_7,
    ];

    #[must_use]
    pub fn new(collider: C) -> Self {
        Self { collider }
    }

    #[must_use]
    pub fn collider(&self) -> &C {
        &self.collider
    }
}

impl<C: Collider> Solid for ColliderSolid<C> {
    fn min(&self) -> Point3 {
        self.collider.min()
    }

    fn max(&self) -> Point3 {
        self.collider.max()
    }

    fn contains(&self, p: &Point3) -> bool {
        if !in_bounds(p, &self.collider.min(), &self.collider.max()) {
            return false;
        }
        let ray = Ray::new(*p, Vector3::from(Self::PROBE));
        self.collider.ray_collisions(&ray) % 2 == 1
    }
}
