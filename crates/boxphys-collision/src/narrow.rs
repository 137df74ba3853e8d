use boxphys_core::{Dim, Dim2, Dim3};
use boxphys_geom::Body;

use crate::point::CollisionPoints;
use crate::{narrow2d, narrow3d};

/// Box-box contact generation. This is the one stage of the pipeline with two
/// hand-written instantiations instead of shared generic code: the 2D clipper
/// works on an edge and one pair of side planes, the 3D one on a face and two
/// pairs.
pub trait NarrowPhaseDim: Dim {
    /// Appends the collision points between two oriented boxes to `out`.
    /// Produces nothing when a separating axis exists.
    fn box_box_collision(
        positions: [Self::Vector; 2],
        rotations: [Self::Rotation; 2],
        half_sizes: [Self::Vector; 2],
        out: &mut CollisionPoints<Self>,
    );
}

impl NarrowPhaseDim for Dim2 {
    #[inline]
    fn box_box_collision(
        positions: [Self::Vector; 2],
        rotations: [Self::Rotation; 2],
        half_sizes: [Self::Vector; 2],
        out: &mut CollisionPoints<Self>,
    ) {
        narrow2d::box_box_2d(positions, rotations, half_sizes, out);
    }
}

impl NarrowPhaseDim for Dim3 {
    #[inline]
    fn box_box_collision(
        positions: [Self::Vector; 2],
        rotations: [Self::Rotation; 2],
        half_sizes: [Self::Vector; 2],
        out: &mut CollisionPoints<Self>,
    ) {
        narrow3d::box_box_3d(positions, rotations, half_sizes, out);
    }
}

/// Collision points between two bodies, A first.
#[inline]
pub fn collide_bodies<D: NarrowPhaseDim>(
    body_a: &Body<D>,
    body_b: &Body<D>,
    out: &mut CollisionPoints<D>,
) {
    D::box_box_collision(
        [body_a.position, body_b.position],
        [body_a.rotation, body_b.rotation],
        [body_a.half_size, body_b.half_size],
        out,
    );
}
