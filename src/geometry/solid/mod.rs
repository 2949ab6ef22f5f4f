mod collider;
mod cuboid;
mod cylinder;
mod joined;
mod sphere;

pub use collider::ColliderSolid;
pub use cuboid::CuboidSolid;
pub use cylinder::CylinderSolid;
pub use joined::JoinedSolid;
pub use sphere::SphereSolid;

use crate::math::Point3;

/// A boolean membership test over 3D space, bounded by an axis-aligned box.
///
/// `contains` must return `false` everywhere outside `[min, max]`, and must
/// be safe to call concurrently from several threads.
pub trait Solid: Send + Sync {
    /// Minimum corner of the bounding box.
    fn min(&self) -> Point3;

    /// Maximum corner of the bounding box.
    fn max(&self) -> Point3;

    /// Returns `true` if `p` is part of the solid.
    fn contains(&self, p: &Point3) -> bool;
}

impl<S: Solid + ?Sized> Solid for &S {
    fn min(&self) -> Point3 {
        (**self).min()
    }

    fn max(&self) -> Point3 {
        (**self).max()
    }

    fn contains(&self, p: &Point3) -> bool {
        (**self).contains(p)
    }
}

impl<S: Solid + ?Sized> Solid for Box<S> {
    fn min(&self) -> Point3 {
        (**self).min()
    }

    fn max(&self) -> Point3 {
        (**self).max()
    }

    fn contains(&self, p: &Point3) -> bool {
        (**self).contains(p)
    }
}

/// Returns `true` if `p` lies inside the box `[min, max]` (boundary included).
#[must_use]
pub fn in_bounds(p: &Point3, min: &Point3, max: &Point3) -> bool {
    (0..3).all(|axis| p[axis] >= min[axis] && p[axis] <= max[axis])
}
