//! Implicit solids to watertight triangle meshes, plus distance and
//! collision queries over the result.
//!
//! A [`Solid`] is sampled on a lattice by [`MarchingCubes`], producing a
//! [`Mesh`]. Meshes can be welded and simplified with the operations in
//! [`operations`], and queried through a [`Bvh`].

pub mod bvh;
pub mod error;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod tessellation;

pub use bvh::{Bvh, ColliderSdf, MeshSdf, PointSdf, Sdf};
pub use error::{Result, SolidMeshError};
pub use geometry::{Collider, Ray, RayCollision, Segment, Solid, Triangle};
pub use mesh::{Mesh, TriangleId};
pub use tessellation::{MarchingCubes, TessellationParams};
