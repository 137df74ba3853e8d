pub mod contact_point;
pub mod manifold;
pub mod solver;

pub use contact_point::ContactPoint;
pub use manifold::ContactManifold;
pub use solver::{pair_key, ContactSolver};
