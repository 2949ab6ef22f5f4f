use crate::math::Point3;

use super::{in_bounds, Solid};

/// A solid axis-aligned box.
#[derive(Debug, Clone, Copy)]
pub struct CuboidSolid {
    pub min: Point3,
    pub max: Point3,
}

impl CuboidSolid {
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }
}

impl Solid for CuboidSolid {
    fn min(&self) -> Point3 {
        self.min
    }

    fn max(&self) -> Point3 {
        self.max
    }

    fn contains(&self, p: &Point3) -> bool {
        in_bounds(p, &self.min, &self.max)
    }
}
