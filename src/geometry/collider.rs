use crate::math::Point3;

use super::{Ray, RayCollision, Triangle};

/// A surface that can be probed with rays and spheres.
///
/// Implementations must be safe for concurrent queries.
pub trait Collider: Send + Sync {
    /// Minimum corner of the bounding box.
    fn min(&self) -> Point3;

    /// Maximum corner of the bounding box.
    fn max(&self) -> Point3;

    /// Counts how many times the ray crosses the surface.
    fn ray_collisions(&self, ray: &Ray) -> usize;

    /// The crossing with the smallest non-negative ray parameter, along with
    /// the surface normal there.
    fn first_ray_collision(&self, ray: &Ray) -> Option<RayCollision>;

    /// Checks whether any part of the surface lies within `r` of `center`.
    fn sphere_collision(&self, center: &Point3, r: f64) -> bool;
}

impl Collider for Triangle {
    fn min(&self) -> Point3 {
        Triangle::min(self)
    }

    fn max(&self) -> Point3 {
        Triangle::max(self)
    }

    fn ray_collisions(&self, ray: &Ray) -> usize {
        usize::from(self.ray_collision(ray).is_some())
    }

    fn first_ray_collision(&self, ray: &Ray) -> Option<RayCollision> {
        self.ray_collision(ray).map(|scale| RayCollision {
            scale,
            normal: self.normal(),
        })
    }

    fn sphere_collision(&self, center: &Point3, r: f64) -> bool {
        Triangle::sphere_collision(self, center, r)
    }
}
