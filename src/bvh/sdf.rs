use crate::error::Result;
use crate::geometry::solid::ColliderSolid;
use crate::geometry::{Collider, Solid};
use crate::math::Point3;
use crate::mesh::Mesh;

use super::Bvh;

/// A signed distance function: positive inside, negative outside.
pub trait Sdf: Send + Sync {
    /// Minimum corner of the surface's bounding box.
    fn min(&self) -> Point3;

    /// Maximum corner of the surface's bounding box.
    fn max(&self) -> Point3;

    fn sdf(&self, p: &Point3) -> f64;
}

/// An [`Sdf`] that can also report the nearest surface point.
pub trait PointSdf: Sdf {
    /// Nearest point on the surface and the signed distance to it.
    fn point_sdf(&self, p: &Point3) -> (Point3, f64);
}

/// Exact signed distance to a closed mesh.
///
/// The magnitude comes from a [`Bvh`] nearest-point query; the sign comes
/// from ray parity against the same tree.
#[derive(Debug, Clone)]
pub struct MeshSdf {
    solid: ColliderSolid<Bvh>,
}

impl MeshSdf {
    /// Groups the mesh's triangles and builds the distance tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is empty.
    pub fn new(mesh: &Mesh) -> Result<Self> {
        Ok(Self::from_bvh(Bvh::from_mesh(mesh)?))
    }

    #[must_use]
    pub fn from_bvh(bvh: Bvh) -> Self {
        Self {
            solid: ColliderSolid::new(bvh),
        }
    }

    #[must_use]
    pub fn bvh(&self) -> &Bvh {
        self.solid.collider()
    }

    fn sign(&self, p: &Point3) -> f64 {
        if self.solid.contains(p) {
            1.0
        } else {
            -1.0
        }
    }
}

impl Sdf for MeshSdf {
    fn min(&self) -> Point3 {
        Collider::min(self.bvh())
    }

    fn max(&self) -> Point3 {
        Collider::max(self.bvh())
    }

    fn sdf(&self, p: &Point3) -> f64 {
        self.sign(p) * self.bvh().distance(p)
    }
}

impl PointSdf for MeshSdf {
    fn point_sdf(&self, p: &Point3) -> (Point3, f64) {
        let closest = self.bvh().closest_point(p);
        (closest, self.sign(p) * (closest - p).norm())
    }
}

/// Approximate signed distance for any [`Collider`].
///
/// The distance is the radius at which a sphere around the query point
/// starts touching the surface. Starting from radius 1, the radius is halved
/// or doubled until the overlap state flips, then the bracket is bisected.
/// Both phases are capped at `iterations` steps.
#[derive(Debug, Clone)]
pub struct ColliderSdf<C> {
    solid: ColliderSolid<C>,
    iterations: usize,
}

impl<C: Collider> ColliderSdf<C> {
    const DEFAULT_ITERATIONS: usize = 32;

    #[must_use]
    pub fn new(collider: C) -> Self {
        Self {
            solid: ColliderSolid::new(collider),
            iterations: Self::DEFAULT_ITERATIONS,
        }
    }

    /// Sets the number of search steps; 0 selects the default of 32.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = if iterations == 0 {
            Self::DEFAULT_ITERATIONS
        } else {
            iterations
        };
        self
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn bracket(&self, p: &Point3) -> (f64, f64) {
        let collider = self.solid.collider();
        let initial = collider.sphere_collision(p, 1.0);
        let mut last = 1.0;
        let mut next = 1.0;
        for _ in 0..self.iterations {
            last = next;
            next = if initial { last / 2.0 } else { last * 2.0 };
            if collider.sphere_collision(p, next) != initial {
                break;
            }
        }
        if next > last {
            (last, next)
        } else {
            (next, last)
        }
    }
}

impl<C: Collider> Sdf for ColliderSdf<C> {
    fn min(&self) -> Point3 {
        self.solid.collider().min()
    }

    fn max(&self) -> Point3 {
        self.solid.collider().max()
    }

    fn sdf(&self, p: &Point3) -> f64 {
        let collider = self.solid.collider();
        let (mut lo, mut hi) = self.bracket(p);
        for _ in 0..self.iterations {
            let mid = (lo + hi) / 2.0;
            if collider.sphere_collision(p, mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        let dist = (lo + hi) / 2.0;
        if self.solid.contains(p) {
            dist
        } else {
            -dist
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::solid::SphereSolid;
    use crate::mesh::tests::tetrahedron;
    use crate::tessellation::{MarchingCubes, TessellationParams};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn mesh_sdf_sign_and_magnitude() {
        let sdf = MeshSdf::new(&tetrahedron()).unwrap();
        assert_relative_eq!(sdf.sdf(&p(0.1, 0.1, 0.1)), 0.1, epsilon = 1e-12);
        assert_relative_eq!(sdf.sdf(&p(0.2, 0.2, -0.5)), -0.5, epsilon = 1e-12);
        let (closest, d) = sdf.point_sdf(&p(0.2, 0.3, -0.5));
        assert_relative_eq!(closest, p(0.2, 0.3, 0.0), epsilon = 1e-12);
        assert_relative_eq!(d, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn empty_mesh_has_no_sdf() {
        assert!(MeshSdf::new(&Mesh::new()).is_err());
    }

    #[test]
    fn collider_sdf_approximates_mesh_sdf() {
        let mesh = MarchingCubes::new(TessellationParams::default().with_delta(0.1))
            .execute(&SphereSolid::new(Point3::origin(), 1.0))
            .unwrap();
        let exact = MeshSdf::new(&mesh).unwrap();
        let approx = ColliderSdf::new(exact.bvh().clone());
        for q in [p(0.0, 0.1, 0.2), p(1.7, 0.3, 0.1), p(-0.4, -0.3, 0.5), p(3.0, 3.0, 3.0)] {
            assert_relative_eq!(approx.sdf(&q), exact.sdf(&q), epsilon = 1e-6);
        }
    }

    #[test]
    fn bounds_follow_the_collider() {
        let exact = MeshSdf::new(&tetrahedron()).unwrap();
        let approx = ColliderSdf::new(exact.bvh().clone());
        for sdf in [&exact as &dyn Sdf, &approx] {
            assert_eq!(sdf.min(), p(0.0, 0.0, 0.0));
            assert_eq!(sdf.max(), p(1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn zero_iterations_selects_default() {
        let bvh = Bvh::from_mesh(&tetrahedron()).unwrap();
        assert_eq!(ColliderSdf::new(bvh).with_iterations(0).iterations(), 32);
    }
}
