mod eliminate;
mod weld;

pub use eliminate::{EliminateCoplanar, EliminateEdges};
pub use weld::WeldVertices;
