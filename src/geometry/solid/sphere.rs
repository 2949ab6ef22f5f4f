use crate::math::{Point3, Vector3};

use super::Solid;

/// A solid ball.
#[derive(Debug, Clone, Copy)]
pub struct SphereSolid {
    pub center: Point3,
    pub radius: f64,
}

impl SphereSolid {
    #[must_use]
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Signed distance to the sphere's surface, positive inside.
    #[must_use]
    pub fn sdf(&self, p: &Point3) -> f64 {
        self.radius - (p - self.center).norm()
    }
}

impl Solid for SphereSolid {
    fn min(&self) -> Point3 {
        self.center - Vector3::repeat(self.radius)
    }

    fn max(&self) -> Point3 {
        self.center + Vector3::repeat(self.radius)
    }

    fn contains(&self, p: &Point3) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_and_bounds() {
        let s = SphereSolid::new(Point3::new(1.0, 0.0, 0.0), 2.0);
        assert!(s.contains(&Point3::new(2.9, 0.0, 0.0)));
        assert!(!s.contains(&Point3::new(3.1, 0.0, 0.0)));
        assert_eq!(s.min(), Point3::new(-1.0, -2.0, -2.0));
        assert_eq!(s.max(), Point3::new(3.0, 2.0, 2.0));
        assert!((s.sdf(&Point3::new(1.0, 0.5, 0.0)) - 1.5).abs() < 1e-12);
    }
}
