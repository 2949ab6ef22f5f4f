use std::collections::{HashMap, HashSet};

use crate::error::{OperationError, Result};
use crate::math::{Point3, VertexKey};
use crate::mesh::Mesh;

type HashCell = [i64; 3];

/// Merges vertices that lie within `epsilon` of each other.
///
/// Each vertex is hashed into the 8 cells obtained by rounding
/// `coordinate / epsilon` and adding 0 or 1 per axis, so two points closer
/// than `epsilon` always share a cell. Vertices that share a cell fall into
/// the same class, and every member of a class is replaced by the first
/// vertex of that class in iteration order.
///
/// Classes are merged as soon as a vertex touches more than one of them,
/// so a single pass over the vertices is enough. Welding an already welded
/// mesh returns the same triangles.
#[derive(Debug, Clone, Copy)]
pub struct WeldVertices {
    epsilon: f64,
}

#[derive(Debug)]
struct WeldClass {
    canonical: Point3,
    members: Vec<VertexKey>,
    cells: HashSet<HashCell>,
}

impl WeldVertices {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Executes the weld, returning a new mesh.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `epsilon` is not positive
    /// and finite.
    pub fn execute(&self, mesh: &Mesh) -> Result<Mesh> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "weld epsilon must be positive, got {}",
                self.epsilon
            ))
            .into());
        }

        let mut classes: Vec<Option<WeldClass>> = Vec::new();
        let mut cell_to_class: HashMap<HashCell, usize> = HashMap::new();

        for v in mesh.vertices() {
            let cells = self.cells(&v);
            let mut touched: Vec<usize> = cells
                .iter()
                .filter_map(|c| cell_to_class.get(c).copied())
                .collect();
            touched.sort_unstable();
            touched.dedup();

            let Some((&target, rest)) = touched.split_first() else {
                let id = classes.len();
                for c in &cells {
                    cell_to_class.insert(*c, id);
                }
                classes.push(Some(WeldClass {
                    canonical: v,
                    members: vec![VertexKey::new(&v)],
                    cells: cells.into_iter().collect(),
                }));
                continue;
            };

            // The oldest class absorbs the others and keeps its canonical vertex.
            let mut merged_members = vec![VertexKey::new(&v)];
            let mut merged_cells: Vec<HashCell> = cells.to_vec();
            for id in rest {
                if let Some(other) = classes[*id].take() {
                    merged_members.extend(other.members);
                    merged_cells.extend(other.cells);
                }
            }
            if let Some(class) = classes[target].as_mut() {
                class.members.extend(merged_members);
                class.cells.extend(merged_cells);
                for c in &class.cells {
                    cell_to_class.insert(*c, target);
                }
            }
        }

        let mut canonical: HashMap<VertexKey, Point3> = HashMap::new();
        let mut merged = 0usize;
        for class in classes.iter().flatten() {
            merged += class.members.len() - 1;
            for key in &class.members {
                canonical.insert(*key, class.canonical);
            }
        }
        tracing::debug!(
            classes = classes.iter().flatten().count(),
            merged,
            epsilon = self.epsilon,
            "welded vertices"
        );

        Ok(mesh
            .triangles()
            .map(|t| t.map(|p| canonical.get(&VertexKey::new(p)).copied().unwrap_or(*p)))
            .collect())
    }

    fn cells(&self, p: &Point3) -> [HashCell; 8] {
        // Coordinates divided by epsilon are assumed to fit in an i64.
        #[allow(clippy::cast_possible_truncation)]
        let base = p.coords.map(|c| (c / self.epsilon).round() as i64);
        std::array::from_fn(|i| {
            [
                base.x + i64::from(i & 1 != 0),
                base.y + i64::from(i & 2 != 0),
                base.z + i64::from(i & 4 != 0),
            ]
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;
    use crate::mesh::tests::tetrahedron;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn nearby_vertices_collapse_to_first_seen() {
        let mut mesh = Mesh::new();
        mesh.add(Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)));
        mesh.add(Triangle::new(p(1.0 + 1e-9, 1e-9, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)));
        let welded = WeldVertices::new(1e-6).execute(&mesh).unwrap();
        assert_eq!(welded.vertex_count(), 4);
        assert_eq!(welded.find_vertex(&p(1.0, 0.0, 0.0)).len(), 2);
        assert!(welded.find_vertex(&p(1.0 + 1e-9, 1e-9, 0.0)).is_empty());
    }

    #[test]
    fn chains_merge_into_one_class() {
        // Each neighbour is within epsilon of the next, so the whole chain
        // becomes one class even though the ends are farther apart.
        let eps = 1e-3;
        let mut mesh = Mesh::new();
        for i in 0..4 {
            let x = f64::from(i) * 0.6 * eps;
            mesh.add(Triangle::new(p(x, 0.0, 0.0), p(5.0, 0.0, 0.0), p(0.0, 5.0, 0.0)));
        }
        let welded = WeldVertices::new(eps).execute(&mesh).unwrap();
        assert!(welded
            .triangles()
            .all(|t| t[0] == p(0.0, 0.0, 0.0)));
    }

    #[test]
    fn distant_vertices_are_untouched() {
        let mesh = tetrahedron();
        let welded = WeldVertices::new(1e-5).execute(&mesh).unwrap();
        assert_eq!(welded.triangle_vec(), mesh.triangle_vec());
    }

    #[test]
    fn welding_is_idempotent() {
        let mut mesh = tetrahedron();
        mesh.add(Triangle::new(p(1e-7, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)));
        let once = WeldVertices::new(1e-5).execute(&mesh).unwrap();
        let twice = WeldVertices::new(1e-5).execute(&once).unwrap();
        assert_eq!(once.triangle_vec(), twice.triangle_vec());
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        let mesh = tetrahedron();
        assert!(WeldVertices::new(0.0).execute(&mesh).is_err());
        assert!(WeldVertices::new(f64::NAN).execute(&mesh).is_err());
    }
}
