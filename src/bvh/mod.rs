//! Bounding volume hierarchy over a mesh's triangles.
//!
//! The tree is built once and never mutated, so it can be queried from any
//! number of threads.

mod collider;
mod sdf;

pub use sdf::{ColliderSdf, MeshSdf, PointSdf, Sdf};

use crate::error::{OperationError, Result};
use crate::geometry::Triangle;
use crate::math::{point_to_bounds_dist_squared, Point3};
use crate::mesh::Mesh;

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(Triangle),
    Branch(Box<Node>, Box<Node>),
}

#[derive(Debug, Clone)]
struct Node {
    min: Point3,
    max: Point3,
    kind: NodeKind,
}

impl Node {
    fn build(triangles: &[Triangle]) -> Node {
        match triangles {
            [t] => Node {
                min: t.min(),
                max: t.max(),
                kind: NodeKind::Leaf(*t),
            },
            _ => {
                let (left, right) = triangles.split_at(triangles.len() / 2);
                let (left, right) = (Node::build(left), Node::build(right));
                Node {
                    min: left.min.inf(&right.min),
                    max: left.max.sup(&right.max),
                    kind: NodeKind::Branch(Box::new(left), Box::new(right)),
                }
            }
        }
    }

    fn bounds_dist_squared(&self, p: &Point3) -> f64 {
        point_to_bounds_dist_squared(p, &self.min, &self.max)
    }

    /// Branch-and-bound search; `best` holds the closest point found so far
    /// and its squared distance.
    fn nearest(&self, p: &Point3, best: &mut (Point3, f64)) {
        match &self.kind {
            NodeKind::Leaf(t) => {
                let c = t.closest(p);
                let d = (c - p).norm_squared();
                if d < best.1 {
                    *best = (c, d);
                }
            }
            NodeKind::Branch(a, b) => {
                let (da, db) = (a.bounds_dist_squared(p), b.bounds_dist_squared(p));
                let ordered = if da <= db {
                    [(a, da), (b, db)]
                } else {
                    [(b, db), (a, da)]
                };
                for (child, bound) in ordered {
                    if bound < best.1 {
                        child.nearest(p, best);
                    }
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(_) => 1,
            NodeKind::Branch(a, b) => 1 + a.depth().max(b.depth()),
        }
    }
}

/// A binary tree over triangles, each node bounded by an axis-aligned box.
///
/// Construction bisects the triangle list in its given order. Lists that are
/// not spatially coherent still produce a correct tree, only a slower one;
/// [`Bvh::from_mesh`] sorts the triangles with [`group_triangles`] first.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Node,
    len: usize,
}

impl Bvh {
    /// Builds a tree from triangles already grouped by locality.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `triangles` is empty.
    pub fn from_grouped(triangles: &[Triangle]) -> Result<Self> {
        if triangles.is_empty() {
            return Err(
                OperationError::InvalidInput("cannot build a tree without triangles".into()).into(),
            );
        }
        let root = Node::build(triangles);
        tracing::debug!(triangles = triangles.len(), depth = root.depth(), "built bvh");
        Ok(Self {
            root,
            len: triangles.len(),
        })
    }

    /// Groups a mesh's triangles spatially and builds a tree over them.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the mesh is empty.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self> {
        let mut triangles = mesh.triangle_vec();
        group_triangles(&mut triangles);
        Self::from_grouped(&triangles)
    }

    /// Number of triangles in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a tree holds at least one triangle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Closest point on the surface to `p`.
    #[must_use]
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        self.nearest(p).0
    }

    /// Unsigned distance from `p` to the surface.
    #[must_use]
    pub fn distance(&self, p: &Point3) -> f64 {
        self.nearest(p).1.sqrt()
    }

    fn nearest(&self, p: &Point3) -> (Point3, f64) {
        let mut best = (*p, f64::INFINITY);
        self.root.nearest(p, &mut best);
        best
    }
}

/// Reorders triangles so that neighbours in the slice are close in space.
///
/// Recursively splits the slice at the median centroid along the axis where
/// the centroids spread the most.
pub fn group_triangles(triangles: &mut [Triangle]) {
    if triangles.len() <= 2 {
        return;
    }
    let (min, max) = triangles
        .iter()
        .map(Triangle::centroid)
        .fold(
            (Point3::from([f64::INFINITY; 3]), Point3::from([f64::NEG_INFINITY; 3])),
            |(lo, hi), c| (lo.inf(&c), hi.sup(&c)),
        );
    let extent = max - min;
    let axis = extent.imax();
    let mid = triangles.len() / 2;
    triangles.select_nth_unstable_by(mid, |a, b| a.centroid()[axis].total_cmp(&b.centroid()[axis]));
    let (left, right) = triangles.split_at_mut(mid);
    group_triangles(left);
    group_triangles(right);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::solid::SphereSolid;
    use crate::tessellation::{MarchingCubes, TessellationParams};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn sphere_mesh() -> Mesh {
        let params = TessellationParams::default().with_delta(0.2);
        MarchingCubes::new(params)
            .execute(&SphereSolid::new(Point3::origin(), 1.0))
            .unwrap()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(Bvh::from_grouped(&[]).is_err());
        assert!(Bvh::from_mesh(&Mesh::new()).is_err());
    }

    #[test]
    fn single_triangle_distance() {
        let t = Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        let bvh = Bvh::from_grouped(&[t]).unwrap();
        assert_relative_eq!(bvh.distance(&p(0.2, 0.2, 2.0)), 2.0, epsilon = 1e-12);
        assert_relative_eq!(bvh.closest_point(&p(-1.0, -1.0, 0.0)), p(0.0, 0.0, 0.0));
    }

    #[test]
    fn pruned_search_matches_brute_force() {
        let mesh = sphere_mesh();
        let bvh = Bvh::from_mesh(&mesh).unwrap();
        assert_eq!(bvh.len(), mesh.triangle_count());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let q = p(
                rng.random_range(-2.0..2.0),
                rng.random_range(-2.0..2.0),
                rng.random_range(-2.0..2.0),
            );
            let brute = mesh
                .triangles()
                .map(|t| t.dist(&q))
                .fold(f64::INFINITY, f64::min);
            assert_relative_eq!(bvh.distance(&q), brute, epsilon = 1e-12);
        }
    }

    #[test]
    fn ungrouped_tree_gives_same_answers() {
        let mesh = sphere_mesh();
        let grouped = Bvh::from_mesh(&mesh).unwrap();
        let raw = Bvh::from_grouped(&mesh.triangle_vec()).unwrap();
        for q in [p(0.0, 0.0, 0.0), p(1.5, 0.2, -0.3), p(-0.1, 0.7, 0.1)] {
            assert_relative_eq!(grouped.distance(&q), raw.distance(&q), epsilon = 1e-12);
        }
    }

    #[test]
    fn grouping_splits_by_widest_axis() {
        let strip = |x: f64| Triangle::new(p(x, 0.0, 0.0), p(x + 0.1, 0.0, 0.0), p(x, 0.1, 0.0));
        let mut tris: Vec<Triangle> = [3.0, 0.0, 2.0, 1.0].into_iter().map(strip).collect();
        group_triangles(&mut tris);
        let left: Vec<f64> = tris[..2].iter().map(|t| t[0].x).collect();
        assert!(left.iter().all(|x| *x < 2.0));
    }

    #[test]
    fn tree_is_balanced() {
        let mesh = sphere_mesh();
        let bvh = Bvh::from_mesh(&mesh).unwrap();
        let n = mesh.triangle_count();
        let limit = (usize::BITS - n.leading_zeros()) as usize + 1;
        assert!(bvh.root.depth() <= limit);
    }
}
