use thiserror::Error;

/// Top-level error type for solid meshing and mesh queries.
#[derive(Debug, Error)]
pub enum SolidMeshError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors raised while sampling a solid on a lattice.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// The solid claimed a point on the padded lattice border, which lies
    /// outside its declared bounding box.
    #[error("solid is inside at ({x}, {y}, {z}), outside of its bounds")]
    SolidOutsideBounds { x: f64, y: f64, z: f64 },
}

/// Errors related to mesh topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("mesh is not manifold: {edges} edge(s) are not shared by exactly two triangles")]
    NonManifold { edges: usize },

    #[error("vertex ({x}, {y}, {z}) does not lie on a lattice edge")]
    VertexNotOnEdge { x: f64, y: f64, z: f64 },
}

/// Errors related to mesh operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`SolidMeshError`].
pub type Result<T> = std::result::Result<T, SolidMeshError>;
