use std::collections::HashSet;

use crate::error::{OperationError, Result};
use crate::geometry::{Segment, Triangle};
use crate::math::{Point3, VertexKey};
use crate::mesh::{Mesh, TriangleId};

/// Collapses edges approved by a predicate until none are left.
///
/// An edge is collapsed by moving both endpoints to its midpoint: the
/// triangles containing the whole edge disappear and the others are
/// re-attached to the midpoint. Edges that would fold a triangle over or
/// create two triangles with the same vertices are never collapsed, so the
/// triangle count never grows and a manifold input stays manifold.
///
/// The predicate sees the mesh as it is at the moment of the collapse.
pub struct EliminateEdges<F> {
    predicate: F,
}

impl<F: Fn(&Mesh, &Segment) -> bool> EliminateEdges<F> {
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }

    /// Executes the simplification, returning a new mesh.
    #[must_use]
    pub fn execute(&self, mesh: &Mesh) -> Mesh {
        let mut result: Mesh = mesh.triangles().copied().collect();
        let mut remaining: HashSet<Segment> = mesh.segments().into_iter().collect();
        let mut collapsed = 0usize;

        let mut changed = true;
        while changed && !remaining.is_empty() {
            changed = false;
            let mut queue: Vec<Segment> = remaining.iter().copied().collect();
            queue.sort_unstable();

            let mut next = 0;
            while next < queue.len() {
                let segment = queue[next];
                next += 1;
                if !remaining.contains(&segment)
                    || !can_eliminate(&result, &segment)
                    || !(self.predicate)(&result, &segment)
                {
                    continue;
                }
                let added = collapse(&mut result, &segment, &mut remaining);
                queue.extend(added);
                collapsed += 1;
                changed = true;
            }
        }

        tracing::debug!(
            collapsed,
            before = mesh.triangle_count(),
            after = result.triangle_count(),
            "eliminated edges"
        );
        result
    }
}

/// Collapses edges whose surrounding triangles all share one plane.
///
/// Two unit normals count as parallel when their dot product is within
/// `epsilon` of 1. Marching cubes output over flat regions shrinks
/// considerably under this operation without changing the enclosed shape.
#[derive(Debug, Clone, Copy)]
pub struct EliminateCoplanar {
    epsilon: f64,
}

impl EliminateCoplanar {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Executes the simplification, returning a new mesh.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `epsilon` is negative or
    /// not finite.
    pub fn execute(&self, mesh: &Mesh) -> Result<Mesh> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "coplanarity epsilon must be non-negative, got {}",
                self.epsilon
            ))
            .into());
        }
        let epsilon = self.epsilon;
        Ok(EliminateEdges::new(|m: &Mesh, s: &Segment| is_coplanar(m, s, epsilon)).execute(mesh))
    }
}

fn is_coplanar(mesh: &Mesh, segment: &Segment, epsilon: f64) -> bool {
    let mut first = None;
    for p in segment.points() {
        for id in mesh.find_vertex(p) {
            let Some(t) = mesh.get(*id) else {
                continue;
            };
            let n = t.normal();
            match first {
                None => first = Some(n),
                Some(f) if (n.dot(&f) - 1.0).abs() > epsilon => return false,
                Some(_) => {}
            }
        }
    }
    true
}

/// Checks that collapsing `segment` keeps the surface consistent.
///
/// For every triangle touching exactly one endpoint, the edge opposite that
/// endpoint must be unique (otherwise two triangles would end up with the
/// same vertices) and must see both endpoints on the same side. Vertices
/// adjacent to both endpoints must belong to a triangle containing the
/// segment.
fn can_eliminate(mesh: &Mesh, segment: &Segment) -> bool {
    let [a, b] = segment.points();
    let [ka, kb] = *segment.keys();
    if !satisfies_link_condition(mesh, segment) {
        return false;
    }
    let mut opposites: Vec<Segment> = Vec::new();
    for (endpoint, key, other) in [(a, ka, kb), (b, kb, ka)] {
        for id in mesh.find_vertex(endpoint) {
            let Some(t) = mesh.get(*id) else {
                continue;
            };
            if t.position_of(other).is_some() {
                continue;
            }
            let Some(i) = t.position_of(key) else {
                continue;
            };
            let (p1, p2) = (t[(i + 1) % 3], t[(i + 2) % 3]);
            let opposite = Segment::new(p1, p2);
            if opposites.contains(&opposite) {
                return false;
            }
            opposites.push(opposite);
            let na = Triangle::new(p1, p2, *a).area_normal();
            let nb = Triangle::new(p1, p2, *b).area_normal();
            if na.dot(&nb) < 0.0 {
                return false;
            }
        }
    }
    true
}

fn satisfies_link_condition(mesh: &Mesh, segment: &Segment) -> bool {
    let [a, b] = segment.points();
    let [ka, kb] = *segment.keys();
    let neighbours = |p: &Point3| -> HashSet<VertexKey> {
        mesh.find_vertex(p)
            .iter()
            .filter_map(|id| mesh.get(*id))
            .flat_map(Triangle::keys)
            .filter(|k| *k != ka && *k != kb)
            .collect()
    };
    let apexes: HashSet<VertexKey> = mesh
        .find_edge(a, b)
        .iter()
        .filter_map(|id| mesh.get(*id))
        .flat_map(Triangle::keys)
        .filter(|k| *k != ka && *k != kb)
        .collect();
    neighbours(a)
        .intersection(&neighbours(b))
        .all(|k| apexes.contains(k))
}

/// Moves both endpoints of `segment` to its midpoint and returns the new
/// edges that touch the midpoint.
fn collapse(mesh: &mut Mesh, segment: &Segment, remaining: &mut HashSet<Segment>) -> Vec<Segment> {
    let [a, b] = segment.points();
    let mid = segment.mid();

    let mut neighbors: Vec<(TriangleId, usize)> = Vec::new();
    for p in [a, b] {
        for id in mesh.find_vertex(p) {
            match neighbors.iter_mut().find(|(n, _)| n == id) {
                Some((_, count)) => *count += 1,
                None => neighbors.push((*id, 1)),
            }
        }
    }

    let mut added = Vec::new();
    for (id, count) in neighbors {
        let Some(mut t) = mesh.remove(id) else {
            continue;
        };
        for s in t.segments() {
            if s.touches(segment) {
                remaining.remove(&s);
            }
        }
        if count != 1 {
            continue;
        }
        let Some(i) = segment
            .keys()
            .iter()
            .find_map(|k| t.position_of(*k))
        else {
            continue;
        };
        t[i] = mid;
        for s in [
            Segment::new(mid, t[(i + 1) % 3]),
            Segment::new(mid, t[(i + 2) % 3]),
        ] {
            remaining.insert(s);
            added.push(s);
        }
        mesh.add(t);
    }
    added
}
