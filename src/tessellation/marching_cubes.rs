use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{Result, TopologyError};
use crate::geometry::{Solid, Triangle};
use crate::math::{Point3, Vector3, VertexKey};
use crate::mesh::Mesh;

use super::case_table::{CornerMask, CASE_TABLE};
use super::{GridSpacer, SolidCache, TessellationParams};

/// Converts a solid into a closed, outward-oriented triangle mesh.
///
/// Every vertex is first placed at the midpoint of a lattice edge whose
/// endpoints disagree on membership. With `refine_iterations > 0`, each
/// vertex is then moved along its edge by bisection, which bounds the
/// distance to the true boundary by `delta / 2^(k + 1)` without changing
/// connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarchingCubes {
    params: TessellationParams,
}

impl MarchingCubes {
    #[must_use]
    pub fn new(params: TessellationParams) -> Self {
        Self { params }
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters or the solid's bounds are invalid,
    /// if the solid contains a point on the padded lattice border, or if
    /// refinement meets a vertex that is not on a lattice edge.
    pub fn execute<S: Solid + ?Sized>(&self, solid: &S) -> Result<Mesh> {
        self.params.validate()?;
        let spacer = GridSpacer::new(&solid.min(), &solid.max(), self.params.delta)?;
        let [nx, ny, nz] = spacer.counts();
        tracing::debug!(nx, ny, nz, delta = self.params.delta, "marching cubes lattice");

        let mut cache = SolidCache::new(solid, spacer, self.params.cache_planes)?;
        let mut mesh = Mesh::new();
        for k in 0..nz - 1 {
            for j in 0..ny - 1 {
                for i in 0..nx - 1 {
                    let mask = cell_mask(&mut cache, i, j, k)?;
                    let stencil = CASE_TABLE.triangles(mask);
                    if stencil.is_empty() {
                        continue;
                    }
                    let corners = cell_corners(&spacer, i, j, k);
                    let mid = |[a, b]: [u8; 2]| {
                        nalgebra::center(&corners[usize::from(a)], &corners[usize::from(b)])
                    };
                    for t in stencil {
                        mesh.add(Triangle::new(mid(t.0[0]), mid(t.0[1]), mid(t.0[2])));
                    }
                }
            }
        }
        tracing::debug!(triangles = mesh.triangle_count(), "marching cubes done");

        if self.params.refine_iterations == 0 {
            return Ok(mesh);
        }
        refine(solid, &spacer, &mesh, self.params.refine_iterations)
    }
}

fn cell_mask<S: Solid + ?Sized>(
    cache: &mut SolidCache<'_, S>,
    i: usize,
    j: usize,
    k: usize,
) -> Result<CornerMask> {
    let mut mask = 0;
    for c in 0..8u8 {
        let (dx, dy, dz) = corner_offset(c);
        if cache.get(i + dx, j + dy, k + dz)? {
            mask |= 1 << c;
        }
    }
    Ok(mask)
}

fn cell_corners(spacer: &GridSpacer, i: usize, j: usize, k: usize) -> [Point3; 8] {
    std::array::from_fn(|c| {
        // `c` is below 8.
        #[allow(clippy::cast_possible_truncation)]
        let (dx, dy, dz) = corner_offset(c as u8);
        spacer.corner(i + dx, j + dy, k + dz)
    })
}

fn corner_offset(c: u8) -> (usize, usize, usize) {
    (
        usize::from(c & 1),
        usize::from((c >> 1) & 1),
        usize::from((c >> 2) & 1),
    )
}

/// Moves every vertex toward the boundary along its lattice edge.
fn refine<S: Solid + ?Sized>(
    solid: &S,
    spacer: &GridSpacer,
    mesh: &Mesh,
    iterations: usize,
) -> Result<Mesh> {
    let moved: HashMap<VertexKey, Point3> = mesh
        .vertices()
        .into_par_iter()
        .map(|v| {
            let normal = mesh.vertex_area_normal(&v);
            let refined = refine_vertex(solid, spacer, &v, &normal, iterations)?;
            Ok((VertexKey::new(&v), refined))
        })
        .collect::<Result<_>>()?;
    tracing::debug!(vertices = moved.len(), iterations, "refined vertices");
    Ok(mesh.map_coords(|p| moved.get(&VertexKey::new(p)).copied().unwrap_or(*p)))
}

fn refine_vertex<S: Solid + ?Sized>(
    solid: &S,
    spacer: &GridSpacer,
    v: &Point3,
    normal: &Vector3,
    iterations: usize,
) -> Result<Point3> {
    let delta = spacer.delta();
    let Some(axis) = (0..3).find(|&axis| {
        let offset = spacer.offset(axis, v[axis]);
        offset > delta / 4.0 && offset < 3.0 * delta / 4.0
    }) else {
        tracing::error!(?v, "vertex is not on a lattice edge");
        return Err(TopologyError::VertexNotOnEdge {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .into());
    };

    let lower = v[axis] - spacer.offset(axis, v[axis]);
    let upper = lower + delta;
    let mut p = *v;
    // The outward normal points from the inside endpoint to the outside one.
    let lower_inside = if normal[axis] == 0.0 {
        p[axis] = lower;
        solid.contains(&p)
    } else {
        normal[axis] > 0.0
    };
    let (mut inside, mut outside) = if lower_inside {
        (lower, upper)
    } else {
        (upper, lower)
    };

    for _ in 0..iterations {
        let mid = (inside + outside) / 2.0;
        p[axis] = mid;
        if solid.contains(&p) {
            inside = mid;
        } else {
            outside = mid;
        }
    }
    p[axis] = (inside + outside) / 2.0;
    Ok(p)
}
