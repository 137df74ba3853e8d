/// Per-step counters returned by `World::step`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepStats {
    /// Pairs reported by the broad phase.
    pub pairs_tested: u32,
    /// Contact points produced by the narrow phase this step.
    pub contacts: u32,
    /// Live manifolds after the obsolete sweep.
    pub manifolds: u32,
}
