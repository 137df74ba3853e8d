use boxphys_core::Dim;

use crate::body::Body;

/// Axis-aligned bounding box. Treated as immutable: the broad phase rebuilds
/// the whole array every step instead of mutating boxes in place.
#[derive(Copy, Clone, Debug)]
pub struct Aabb<D: Dim> {
    pub min: D::Vector,
    pub max: D::Vector,
}

impl<D: Dim> Aabb<D> {
    #[inline]
    pub fn new(min: D::Vector, max: D::Vector) -> Self {
        for i in 0..D::AXES {
            debug_assert!(D::axis(min, i) <= D::axis(max, i));
        }
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: D::Vector, half_extents: D::Vector) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    #[inline]
    pub fn center(&self) -> D::Vector {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb<D>) -> bool {
        self.overlaps_from_axis(other, 0)
    }

    /// Overlap test restricted to axes `first..`; the broad phase sweeps
    /// along x and only needs the remaining axes here.
    #[inline]
    pub fn overlaps_from_axis(&self, other: &Aabb<D>, first: usize) -> bool {
        for i in first..D::AXES {
            if D::axis(self.max, i) < D::axis(other.min, i)
                || D::axis(other.max, i) < D::axis(self.min, i)
            {
                return false;
            }
        }
        true
    }
}

/// World AABB of a box body: extents are `|R| * half_size`.
#[inline]
pub fn aabb_of<D: Dim>(body: &Body<D>) -> Aabb<D> {
    let abs_rot = D::mat_abs(&D::rot_matrix(&body.rotation));
    let extents = D::mat_mul_vec(&abs_rot, body.half_size);
    Aabb::from_center_half_extents(body.position, extents)
}
