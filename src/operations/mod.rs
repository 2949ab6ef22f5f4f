pub mod repair;
pub mod smooth;

pub use repair::{EliminateCoplanar, EliminateEdges, WeldVertices};
pub use smooth::Blur;
