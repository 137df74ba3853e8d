use boxphys_core::{Dim, Scalar};
use smallvec::SmallVec;

/// One topological feature of a box.
///
/// `geometry` is 0 or 1 (which box of the pair); `index` identifies the
/// feature on that box: an edge 0-3 in 2D, a face 0-5 in 3D.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Feature {
    pub geometry: u8,
    pub index: u8,
}

/// The two features whose interaction produced a contact point. Used as the
/// persistence key that lets impulses survive across steps.
pub type FeaturePair = [Feature; 2];

/// Sorts the pair so the key does not depend on which box was the reference.
#[inline]
pub fn canonicalize(pair: &mut FeaturePair) {
    if pair[1] < pair[0] {
        pair.swap(0, 1);
    }
}

/// Contact point produced by the narrow phase.
#[derive(Copy, Clone, Debug)]
pub struct CollisionPoint<D: Dim> {
    /// World-space position, projected onto the reference face.
    pub position: D::Vector,

    /// Unit normal pointing from body A to body B.
    pub normal: D::Vector,

    /// Penetration depth, >= 0.
    pub penetration: Scalar,

    /// Persistence key, canonically ordered.
    pub feature_pair: FeaturePair,

    /// Which box (0 or 1) supplied the reference face.
    pub clip_box: u8,

    /// The contact in each body's local frame. Index 0 is body A.
    pub local_points: [D::Vector; 2],

    /// Reference normal in the clipping box's local frame.
    pub local_normal: D::Vector,
}

/// Narrow-phase output buffer; inline capacity covers the 3D maximum.
pub type CollisionPoints<D> = SmallVec<[CollisionPoint<D>; 8]>;

/// Collision points between one body pair, as handed to the contact solver.
#[derive(Clone, Debug)]
pub struct CollisionManifold<D: Dim> {
    pub body_a: u32,
    pub body_b: u32,
    pub points: CollisionPoints<D>,
}

impl<D: Dim> CollisionManifold<D> {
    #[inline]
    pub fn new(body_a: u32, body_b: u32) -> Self {
        assert!(body_a < body_b);
        Self {
            body_a,
            body_b,
            points: CollisionPoints::new(),
        }
    }
}
