pub mod scalar;
pub mod ids;
pub mod types;
pub mod dim;
pub mod hash;
pub mod time;
pub mod schedule;
pub mod rng;

pub use scalar::Scalar;
pub use ids::BodyId;
pub use types::{Rot2, Rot3, Vec2, Vec3, Mat2, Mat3};
pub use dim::{Dim, Dim2, Dim3};
pub use hash::{StepHasher, hash_scalar, hash_vec2, hash_vec3};
pub use time::StepStats;
pub use schedule::{StepStage, schedule_digest};
pub use rng::XorShift64;
pub use glam::Quat;
