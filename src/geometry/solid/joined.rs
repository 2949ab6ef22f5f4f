use crate::math::Point3;

use super::Solid;

/// The union of several solids.
pub struct JoinedSolid {
    solids: Vec<Box<dyn Solid>>,
}

impl JoinedSolid {
    #[must_use]
    pub fn new(solids: Vec<Box<dyn Solid>>) -> Self {
        Self { solids }
    }
}

impl Solid for JoinedSolid {
    fn min(&self) -> Point3 {
        self.solids
            .iter()
            .map(|s| s.min())
            .reduce(|a, b| a.inf(&b))
            .unwrap_or_else(Point3::origin)
    }

    fn max(&self) -> Point3 {
        self.solids
            .iter()
            .map(|s| s.max())
            .reduce(|a, b| a.sup(&b))
            .unwrap_or_else(Point3::origin)
    }

    fn contains(&self, p: &Point3) -> bool {
        self.solids.iter().any(|s| s.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::solid::{CuboidSolid, SphereSolid};

    #[test]
    fn union_bounds_and_membership() {
        let joined = JoinedSolid::new(vec![
            Box::new(CuboidSolid::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))),
            Box::new(SphereSolid::new(Point3::new(3.0, 0.0, 0.0), 0.5)),
        ]);
        assert_eq!(joined.min(), Point3::new(0.0, -0.5, -0.5));
        assert_eq!(joined.max(), Point3::new(3.5, 1.0, 1.0));
        assert!(joined.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(joined.contains(&Point3::new(3.2, 0.0, 0.0)));
        assert!(!joined.contains(&Point3::new(2.0, 0.0, 0.0)));
    }
}
