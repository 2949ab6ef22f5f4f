mod collider;
mod ray;
mod segment;
pub mod solid;
mod triangle;

pub use collider::Collider;
pub use ray::{Ray, RayCollision};
pub use segment::Segment;
pub use solid::Solid;
pub use triangle::Triangle;
