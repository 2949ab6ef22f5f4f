use crate::math::{Point3, Vector3};

/// A half-line starting at `origin` and extending along `direction`.
///
/// The direction is not normalized; collision distances are expressed as
/// multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point `origin + t * direction`.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Where a ray first meets a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCollision {
    /// Multiple of the ray direction at which the hit occurs (non-negative).
    pub scale: f64,
    /// Unit normal of the surface at the hit.
    pub normal: Vector3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_scales_direction() {
        let ray = Ray::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(ray.at(1.5), Point3::new(1.0, 3.0, 0.0));
    }
}
