use crate::math::{Point3, Vector3};

use super::Solid;

/// A solid cylinder between two cap centers.
#[derive(Debug, Clone, Copy)]
pub struct CylinderSolid {
    pub p1: Point3,
    pub p2: Point3,
    pub radius: f64,
}

impl CylinderSolid {
    #[must_use]
    pub fn new(p1: Point3, p2: Point3, radius: f64) -> Self {
        Self { p1, p2, radius }
    }
}

impl Solid for CylinderSolid {
    fn min(&self) -> Point3 {
        self.p1.inf(&self.p2) - Vector3::repeat(self.radius)
    }

    fn max(&self) -> Point3 {
        self.p1.sup(&self.p2) + Vector3::repeat(self.radius)
    }

    fn contains(&self, p: &Point3) -> bool {
        let axis = self.p2 - self.p1;
        let len_sq = axis.norm_squared();
        if len_sq == 0.0 {
            return false;
        }
        let rel = p - self.p1;
        let t = rel.dot(&axis) / len_sq;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        (rel - axis * t).norm_squared() <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_membership() {
        let c = CylinderSolid::new(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0), 0.5);
        assert!(c.contains(&Point3::new(0.3, 0.3, 0.9)));
        assert!(!c.contains(&Point3::new(0.4, 0.4, 0.0)));
        assert!(!c.contains(&Point3::new(0.0, 0.0, 1.01)));
        assert_eq!(c.min(), Point3::new(-0.5, -0.5, -1.5));
    }
}
