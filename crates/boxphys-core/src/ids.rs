use core::fmt;

/// Stable index of a body inside a world. Valid until `World::clear`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({})", self.0)
    }
}
