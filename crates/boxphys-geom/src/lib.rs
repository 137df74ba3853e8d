pub mod aabb;
pub mod body;
pub mod plane;

pub use aabb::{aabb_of, Aabb};
pub use body::Body;
pub use plane::Plane;
