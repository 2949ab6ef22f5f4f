//! Triangle mesh with a lazily built vertex-adjacency index.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use slotmap::SlotMap;

use crate::error::{Result, TopologyError};
use crate::geometry::{Segment, Triangle};
use crate::math::{Point3, Vector3, VertexKey};

slotmap::new_key_type! {
    /// Unique identifier for a triangle owned by a [`Mesh`].
    pub struct TriangleId;
}

type VertexIndex = HashMap<VertexKey, Vec<TriangleId>>;

/// A set of oriented triangles.
///
/// Triangles live in an arena and are addressed by [`TriangleId`]. Adding
/// the same triangle value twice stores two independent elements.
///
/// The vertex → triangles index is a cache: it is built on the first
/// adjacency query and kept up to date by [`Mesh::add`] and
/// [`Mesh::remove`] afterwards. Mutation is not synchronized; share a mesh
/// across threads only for reading.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: SlotMap<TriangleId, Triangle>,
    vertex_index: OnceLock<VertexIndex>,
}

impl Mesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a triangle and returns its ID.
    pub fn add(&mut self, triangle: Triangle) -> TriangleId {
        let id = self.triangles.insert(triangle);
        if let Some(index) = self.vertex_index.get_mut() {
            index_triangle(index, id, &triangle);
        }
        id
    }

    /// Removes a triangle, returning it if it was present.
    pub fn remove(&mut self, id: TriangleId) -> Option<Triangle> {
        let triangle = self.triangles.remove(id)?;
        if let Some(index) = self.vertex_index.get_mut() {
            for key in distinct_keys(&triangle) {
                if let Some(ids) = index.get_mut(&key) {
                    ids.retain(|t| *t != id);
                    if ids.is_empty() {
                        index.remove(&key);
                    }
                }
            }
        }
        Some(triangle)
    }

    /// Returns the triangle with the given ID.
    #[must_use]
    pub fn get(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of distinct vertex coordinates.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.index().len()
    }

    /// Iterates over all triangles with their IDs.
    ///
    /// The order is stable for an unmodified mesh, so iteration can be
    /// restarted and yields the same sequence.
    pub fn iter(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles.iter()
    }

    /// Iterates over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.values()
    }

    /// Copies all triangles into a vector.
    #[must_use]
    pub fn triangle_vec(&self) -> Vec<Triangle> {
        self.triangles.values().copied().collect()
    }

    /// Distinct vertices in order of first appearance.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for t in self.triangles.values() {
            for p in t.vertices() {
                if seen.insert(VertexKey::new(p)) {
                    result.push(*p);
                }
            }
        }
        result
    }

    /// Distinct edges in order of first appearance.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let mut seen = HashSet::new();
        self.triangles
            .values()
            .flat_map(Triangle::segments)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// IDs of all triangles that have `p` as a vertex.
    #[must_use]
    pub fn find_vertex(&self, p: &Point3) -> &[TriangleId] {
        self.index()
            .get(&VertexKey::new(p))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// IDs of all triangles that have both `a` and `b` as vertices.
    #[must_use]
    pub fn find_edge(&self, a: &Point3, b: &Point3) -> Vec<TriangleId> {
        let kb = VertexKey::new(b);
        self.find_vertex(a)
            .iter()
            .copied()
            .filter(|id| {
                self.triangles
                    .get(*id)
                    .is_some_and(|t| t.position_of(kb).is_some())
            })
            .collect()
    }

    /// Sum of the area-weighted normals of the triangles touching `p`.
    #[must_use]
    pub fn vertex_area_normal(&self, p: &Point3) -> Vector3 {
        self.find_vertex(p)
            .iter()
            .filter_map(|id| self.triangles.get(*id))
            .map(Triangle::area_normal)
            .sum()
    }

    /// Number of edges that are not shared by exactly two triangles.
    #[must_use]
    pub fn non_manifold_edges(&self) -> usize {
        self.segments()
            .iter()
            .filter(|s| {
                let [a, b] = s.points();
                self.find_edge(a, b).len() != 2
            })
            .count()
    }

    /// Checks whether some edge is not shared by exactly two triangles.
    #[must_use]
    pub fn needs_repair(&self) -> bool {
        self.triangles.values().any(|t| {
            t.segments().iter().any(|s| {
                let [a, b] = s.points();
                self.find_edge(a, b).len() != 2
            })
        })
    }

    /// Asserts that the mesh is a strict 2-manifold.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NonManifold`] if any edge is not shared by
    /// exactly two triangles.
    pub fn ensure_manifold(&self) -> Result<()> {
        match self.non_manifold_edges() {
            0 => Ok(()),
            edges => {
                tracing::error!(edges, "mesh asserted manifold but is not");
                Err(TopologyError::NonManifold { edges }.into())
            }
        }
    }

    /// Creates a new mesh by passing every vertex through `f`.
    ///
    /// Each distinct vertex is mapped exactly once, so shared vertices stay
    /// shared.
    #[must_use]
    pub fn map_coords(&self, mut f: impl FnMut(&Point3) -> Point3) -> Mesh {
        let mut mapped: HashMap<VertexKey, Point3> = HashMap::new();
        self.triangles
            .values()
            .map(|t| {
                t.map(|p| {
                    *mapped
                        .entry(VertexKey::new(p))
                        .or_insert_with(|| f(p))
                })
            })
            .collect()
    }

    /// Bounding box of all vertices, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        self.triangles
            .values()
            .map(|t| (t.min(), t.max()))
            .reduce(|(min, max), (tmin, tmax)| (min.inf(&tmin), max.sup(&tmax)))
    }

    fn index(&self) -> &VertexIndex {
        self.vertex_index.get_or_init(|| {
            let mut index = VertexIndex::new();
            for (id, t) in &self.triangles {
                index_triangle(&mut index, id, t);
            }
            index
        })
    }
}

impl FromIterator<Triangle> for Mesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        let mut mesh = Mesh::new();
        mesh.extend(iter);
        mesh
    }
}

impl Extend<Triangle> for Mesh {
    fn extend<I: IntoIterator<Item = Triangle>>(&mut self, iter: I) {
        for t in iter {
            self.add(t);
        }
    }
}

fn distinct_keys(t: &Triangle) -> Vec<VertexKey> {
    let mut keys = t.keys().to_vec();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn index_triangle(index: &mut VertexIndex, id: TriangleId, t: &Triangle) {
    for key in distinct_keys(t) {
        index.entry(key).or_default().push(id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Outward-oriented unit tetrahedron.
    pub(crate) fn tetrahedron() -> Mesh {
        let o = p(0.0, 0.0, 0.0);
        let x = p(1.0, 0.0, 0.0);
        let y = p(0.0, 1.0, 0.0);
        let z = p(0.0, 0.0, 1.0);
        [
            Triangle::new(o, y, x),
            Triangle::new(o, x, z),
            Triangle::new(o, z, y),
            Triangle::new(x, y, z),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn tetrahedron_is_manifold() {
        let mesh = tetrahedron();
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.segments().len(), 6);
        assert!(!mesh.needs_repair());
        assert!(mesh.ensure_manifold().is_ok());
    }

    #[test]
    fn removing_a_face_breaks_manifoldness() {
        let mut mesh = tetrahedron();
        let id = mesh.iter().next().unwrap().0;
        // Build the index first so that removal exercises the incremental path.
        assert_eq!(mesh.find_vertex(&p(0.0, 0.0, 0.0)).len(), 3);
        mesh.remove(id).unwrap();
        assert!(mesh.needs_repair());
        assert_eq!(mesh.non_manifold_edges(), 3);
        assert!(matches!(
            mesh.ensure_manifold(),
            Err(crate::SolidMeshError::Topology(TopologyError::NonManifold { edges: 3 }))
        ));
        assert_eq!(mesh.find_vertex(&p(0.0, 0.0, 0.0)).len(), 2);
    }

    #[test]
    fn index_follows_additions() {
        let mut mesh = tetrahedron();
        assert_eq!(mesh.find_vertex(&p(1.0, 0.0, 0.0)).len(), 3);
        mesh.add(Triangle::new(p(1.0, 0.0, 0.0), p(5.0, 5.0, 5.0), p(6.0, 5.0, 5.0)));
        assert_eq!(mesh.find_vertex(&p(1.0, 0.0, 0.0)).len(), 4);
        assert_eq!(mesh.find_vertex(&p(5.0, 5.0, 5.0)).len(), 1);
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn find_edge_returns_both_sides() {
        let mesh = tetrahedron();
        let tris = mesh.find_edge(&p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert_eq!(tris.len(), 2);
        assert!(mesh.find_edge(&p(1.0, 0.0, 0.0), &p(7.0, 1.0, 0.0)).is_empty());
    }

    #[test]
    fn duplicate_values_are_independent() {
        let mut mesh = Mesh::new();
        let t = Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        let a = mesh.add(t);
        let b = mesh.add(t);
        assert_ne!(a, b);
        assert_eq!(mesh.triangle_count(), 2);
        mesh.remove(a);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.get(b), Some(&t));
    }

    #[test]
    fn map_coords_preserves_topology() {
        let mesh = tetrahedron();
        let moved = mesh.map_coords(|c| c * 2.0 + Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(moved.triangle_count(), 4);
        assert!(!moved.needs_repair());
        let (min, max) = moved.bounds().unwrap();
        assert_eq!(min, p(1.0, 0.0, 0.0));
        assert_eq!(max, p(3.0, 2.0, 2.0));
    }

    #[test]
    fn iteration_is_restartable() {
        let mesh = tetrahedron();
        let first: Vec<_> = mesh.triangles().copied().collect();
        let second: Vec<_> = mesh.triangles().copied().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn outward_area_normals_sum_to_zero() {
        let mesh = tetrahedron();
        let total: Vector3 = mesh.triangles().map(Triangle::area_normal).sum();
        assert!(total.norm() < 1e-12);
        // The corner at the origin sees three faces pointing away from it.
        let n = mesh.vertex_area_normal(&p(0.0, 0.0, 0.0));
        assert!(n.x < 0.0 && n.y < 0.0 && n.z < 0.0);
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert!(!mesh.needs_repair());
    }
}
