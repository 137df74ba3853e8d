use crate::StepHasher;

/// Stages of one `World::step`, in execution order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStage {
    ApplyGravity = 1,
    BroadPhase = 2,
    NarrowPhase = 3,
    PrepareSolve = 4,
    SolveVelocities = 5,
    Integrate = 6,
    SolvePositions = 7,
}

/// Digest of a recorded stage sequence; folded into the step hash so a
/// schedule change shows up as a state divergence.
pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages {
        h.update_bytes(&[*s as u8]);
    }
    h.finalize()
}
