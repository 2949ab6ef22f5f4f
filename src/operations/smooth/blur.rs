use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, VertexKey};
use crate::mesh::Mesh;

/// Laplacian smoothing.
///
/// Each pass moves every vertex toward the average of its neighbours:
/// `p' = (1 - rate) * p + rate * avg`. One pass is run per rate, in order.
/// Connectivity is left unchanged.
#[derive(Debug, Clone)]
pub struct Blur {
    rates: Vec<f64>,
}

impl Blur {
    #[must_use]
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    /// Executes the smoothing, returning a new mesh.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if a rate is not finite.
    pub fn execute(&self, mesh: &Mesh) -> Result<Mesh> {
        if let Some(rate) = self.rates.iter().find(|r| !r.is_finite()) {
            return Err(
                OperationError::InvalidInput(format!("blur rate must be finite, got {rate}")).into(),
            );
        }

        let mut coords = mesh.vertices();
        let index: HashMap<VertexKey, usize> = coords
            .iter()
            .enumerate()
            .map(|(i, p)| (VertexKey::new(p), i))
            .collect();

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); coords.len()];
        for t in mesh.triangles() {
            let ids = t.keys().map(|k| index[&k]);
            for &a in &ids {
                for &b in &ids {
                    if a != b && !neighbors[a].contains(&b) {
                        neighbors[a].push(b);
                    }
                }
            }
        }

        for &rate in &self.rates {
            coords = coords
                .par_iter()
                .zip(neighbors.par_iter())
                .map(|(p, around)| {
                    if around.is_empty() {
                        return *p;
                    }
                    let sum: Vector3 = around.iter().map(|&n| coords[n].coords).sum();
                    #[allow(clippy::cast_precision_loss)]
                    let avg = sum / around.len() as f64;
                    Point3::from(p.coords * (1.0 - rate) + avg * rate)
                })
                .collect();
        }
        tracing::debug!(vertices = coords.len(), passes = self.rates.len(), "blurred mesh");

        Ok(mesh
            .triangles()
            .map(|t| t.map(|p| index.get(&VertexKey::new(p)).map_or(*p, |&i| coords[i])))
            .collect())
    }
}
