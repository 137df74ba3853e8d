use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::{Mat2, Mat3A, Quat, Vec2, Vec3, Vec3A};

use crate::hash::StepHasher;
use crate::types::{Rot2, Rot3};
use crate::Scalar;

/// Dimension protocol shared by the 2D and 3D engine instantiations.
///
/// The simulation pipeline (broad phase, manifold bookkeeping, solver, world)
/// is written once against this trait; `Dim2` and `Dim3` supply the concrete
/// algebra. The dimension is fixed when a world is constructed, so there is
/// no dynamic dispatch anywhere in the step.
pub trait Dim: Copy + Clone + Debug + PartialEq + Eq + Send + Sync + 'static {
    /// Number of spatial axes.
    const AXES: usize;

    /// Maximum number of contact points a box-box manifold can carry.
    const MAX_POINTS: usize;

    type Vector: Copy
        + Clone
        + Debug
        + Default
        + PartialEq
        + Add<Output = Self::Vector>
        + Sub<Output = Self::Vector>
        + Mul<Scalar, Output = Self::Vector>
        + Neg<Output = Self::Vector>
        + AddAssign;

    type Rotation: Copy + Clone + Debug + Default;

    type Matrix: Copy + Clone + Debug;

    /// Angular velocity / angular impulse delta: scalar in 2D, vector in 3D.
    type AngVector: Copy
        + Clone
        + Debug
        + Default
        + PartialEq
        + Add<Output = Self::AngVector>
        + Mul<Scalar, Output = Self::AngVector>
        + Neg<Output = Self::AngVector>
        + AddAssign;

    /// Moment of inertia (and its inverse): scalar in 2D, tensor in 3D.
    type Inertia: Copy + Clone + Debug;

    // ----- vectors -----

    fn axis(v: Self::Vector, i: usize) -> Scalar;
    fn dot(a: Self::Vector, b: Self::Vector) -> Scalar;

    #[inline]
    fn length_squared(v: Self::Vector) -> Scalar {
        Self::dot(v, v)
    }

    // ----- angular algebra -----

    /// `r x v`: perp-dot in 2D, the usual cross product in 3D.
    fn cross(r: Self::Vector, v: Self::Vector) -> Self::AngVector;

    /// `w x r` for an angular velocity `w`.
    fn ang_cross(w: Self::AngVector, r: Self::Vector) -> Self::Vector;

    fn ang_dot(a: Self::AngVector, b: Self::AngVector) -> Scalar;

    // ----- matrices -----

    fn mat_col(m: &Self::Matrix, i: usize) -> Self::Vector;
    fn mat_transpose(m: &Self::Matrix) -> Self::Matrix;
    /// Componentwise absolute value; used for world AABB extents.
    fn mat_abs(m: &Self::Matrix) -> Self::Matrix;
    fn mat_mul_vec(m: &Self::Matrix, v: Self::Vector) -> Self::Vector;
    fn mat_mul(a: &Self::Matrix, b: &Self::Matrix) -> Self::Matrix;

    // ----- rotations -----

    fn rot_matrix(r: &Self::Rotation) -> Self::Matrix;

    #[inline]
    fn rot_inverse_matrix(r: &Self::Rotation) -> Self::Matrix {
        Self::mat_transpose(&Self::rot_matrix(r))
    }

    #[inline]
    fn rotate(r: &Self::Rotation, v: Self::Vector) -> Self::Vector {
        Self::mat_mul_vec(&Self::rot_matrix(r), v)
    }

    /// Composes `r` with the rotation described by the scaled-axis `dtheta`
    /// (angle addition in 2D, left-multiplied renormalized quaternion in 3D).
    fn integrate_rot(r: &Self::Rotation, dtheta: Self::AngVector) -> Self::Rotation;

    // ----- inertia -----

    fn inertia_zero() -> Self::Inertia;
    /// Box moment of inertia about the center of mass.
    fn box_inertia(half_size: Self::Vector, mass: Scalar) -> Self::Inertia;
    /// Inverse inertia; zero maps to zero (static bodies).
    fn invert_inertia(inertia: &Self::Inertia) -> Self::Inertia;
    /// World-frame inverse inertia. Identity in 2D, `R * I^-1 * R^T` in 3D.
    fn world_inv_inertia(local: &Self::Inertia, r: &Self::Rotation) -> Self::Inertia;
    fn apply_inertia(i: &Self::Inertia, w: Self::AngVector) -> Self::AngVector;

    // ----- contact frame -----

    /// Friction tangent for a contact with the given normal and relative
    /// velocity at the contact point.
    fn tangent(normal: Self::Vector, rel_vel: Self::Vector) -> Self::Vector;

    // ----- hashing -----

    fn hash_vector(h: &mut StepHasher, v: Self::Vector);
    fn hash_rotation(h: &mut StepHasher, r: &Self::Rotation);
    fn hash_ang_vector(h: &mut StepHasher, w: Self::AngVector);
}

/// The 2D instantiation: `Vec2`, angle rotation, scalar inertia.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dim2;

/// The 3D instantiation: `Vec3A`, quaternion rotation, tensor inertia.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dim3;

impl Dim for Dim2 {
    const AXES: usize = 2;
    const MAX_POINTS: usize = 2;

    type Vector = Vec2;
    type Rotation = Rot2;
    type Matrix = Mat2;
    type AngVector = Scalar;
    type Inertia = Scalar;

    #[inline]
    fn axis(v: Vec2, i: usize) -> Scalar {
        match i {
            0 => v.x,
            _ => v.y,
        }
    }

    #[inline]
    fn dot(a: Vec2, b: Vec2) -> Scalar {
        a.dot(b)
    }

    #[inline]
    fn cross(r: Vec2, v: Vec2) -> Scalar {
        r.perp_dot(v)
    }

    #[inline]
    fn ang_cross(w: Scalar, r: Vec2) -> Vec2 {
        r.perp() * w
    }

    #[inline]
    fn ang_dot(a: Scalar, b: Scalar) -> Scalar {
        a * b
    }

    #[inline]
    fn mat_col(m: &Mat2, i: usize) -> Vec2 {
        m.col(i)
    }

    #[inline]
    fn mat_transpose(m: &Mat2) -> Mat2 {
        m.transpose()
    }

    #[inline]
    fn mat_abs(m: &Mat2) -> Mat2 {
        Mat2::from_cols(m.x_axis.abs(), m.y_axis.abs())
    }

    #[inline]
    fn mat_mul_vec(m: &Mat2, v: Vec2) -> Vec2 {
        *m * v
    }

    #[inline]
    fn mat_mul(a: &Mat2, b: &Mat2) -> Mat2 {
        *a * *b
    }

    #[inline]
    fn rot_matrix(r: &Rot2) -> Mat2 {
        r.mat()
    }

    #[inline]
    fn integrate_rot(r: &Rot2, dtheta: Scalar) -> Rot2 {
        Rot2::new(r.angle() + dtheta)
    }

    #[inline]
    fn inertia_zero() -> Scalar {
        0.0
    }

    #[inline]
    fn box_inertia(half_size: Vec2, mass: Scalar) -> Scalar {
        let size = half_size * 2.0;
        mass * size.length_squared() / 12.0
    }

    #[inline]
    fn invert_inertia(inertia: &Scalar) -> Scalar {
        if *inertia == 0.0 {
            0.0
        } else {
            1.0 / inertia
        }
    }

    #[inline]
    fn world_inv_inertia(local: &Scalar, _r: &Rot2) -> Scalar {
        *local
    }

    #[inline]
    fn apply_inertia(i: &Scalar, w: Scalar) -> Scalar {
        i * w
    }

    #[inline]
    fn tangent(normal: Vec2, _rel_vel: Vec2) -> Vec2 {
        // cross(normal, 1): the clockwise perpendicular
        Vec2::new(normal.y, -normal.x)
    }

    #[inline]
    fn hash_vector(h: &mut StepHasher, v: Vec2) {
        crate::hash::hash_vec2(h, &v);
    }

    #[inline]
    fn hash_rotation(h: &mut StepHasher, r: &Rot2) {
        crate::hash::hash_scalar(h, r.angle());
    }

    #[inline]
    fn hash_ang_vector(h: &mut StepHasher, w: Scalar) {
        crate::hash::hash_scalar(h, w);
    }
}

impl Dim for Dim3 {
    const AXES: usize = 3;
    const MAX_POINTS: usize = 8;

    type Vector = Vec3A;
    type Rotation = Rot3;
    type Matrix = Mat3A;
    type AngVector = Vec3A;
    type Inertia = Mat3A;

    #[inline]
    fn axis(v: Vec3A, i: usize) -> Scalar {
        match i {
            0 => v.x,
            1 => v.y,
            _ => v.z,
        }
    }

    #[inline]
    fn dot(a: Vec3A, b: Vec3A) -> Scalar {
        a.dot(b)
    }

    #[inline]
    fn cross(r: Vec3A, v: Vec3A) -> Vec3A {
        r.cross(v)
    }

    #[inline]
    fn ang_cross(w: Vec3A, r: Vec3A) -> Vec3A {
        w.cross(r)
    }

    #[inline]
    fn ang_dot(a: Vec3A, b: Vec3A) -> Scalar {
        a.dot(b)
    }

    #[inline]
    fn mat_col(m: &Mat3A, i: usize) -> Vec3A {
        m.col(i)
    }

    #[inline]
    fn mat_transpose(m: &Mat3A) -> Mat3A {
        m.transpose()
    }

    #[inline]
    fn mat_abs(m: &Mat3A) -> Mat3A {
        Mat3A::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs())
    }

    #[inline]
    fn mat_mul_vec(m: &Mat3A, v: Vec3A) -> Vec3A {
        *m * v
    }

    #[inline]
    fn mat_mul(a: &Mat3A, b: &Mat3A) -> Mat3A {
        *a * *b
    }

    #[inline]
    fn rot_matrix(r: &Rot3) -> Mat3A {
        r.mat()
    }

    #[inline]
    fn integrate_rot(r: &Rot3, dtheta: Vec3A) -> Rot3 {
        Rot3::new(Quat::from_scaled_axis(Vec3::from(dtheta)) * r.quat())
    }

    #[inline]
    fn inertia_zero() -> Mat3A {
        Mat3A::ZERO
    }

    #[inline]
    fn box_inertia(half_size: Vec3A, mass: Scalar) -> Mat3A {
        let size = half_size * 2.0;
        let sq = size * size;
        let c = mass / 12.0;
        Mat3A::from_diagonal(Vec3::new(
            c * (sq.y + sq.z),
            c * (sq.x + sq.z),
            c * (sq.x + sq.y),
        ))
    }

    #[inline]
    fn invert_inertia(inertia: &Mat3A) -> Mat3A {
        if *inertia == Mat3A::ZERO {
            Mat3A::ZERO
        } else {
            inertia.inverse()
        }
    }

    #[inline]
    fn world_inv_inertia(local: &Mat3A, r: &Rot3) -> Mat3A {
        let rm = r.mat();
        rm * *local * rm.transpose()
    }

    #[inline]
    fn apply_inertia(i: &Mat3A, w: Vec3A) -> Vec3A {
        *i * w
    }

    #[inline]
    fn tangent(normal: Vec3A, rel_vel: Vec3A) -> Vec3A {
        let tangential = rel_vel - normal * rel_vel.dot(normal);
        let len_sq = tangential.length_squared();
        if len_sq > 1.0e-12 {
            tangential * (1.0 / len_sq.sqrt())
        } else {
            orthonormal_axis(normal)
        }
    }

    #[inline]
    fn hash_vector(h: &mut StepHasher, v: Vec3A) {
        crate::hash::hash_vec3(h, &v);
    }

    #[inline]
    fn hash_rotation(h: &mut StepHasher, r: &Rot3) {
        crate::hash::hash_quat(h, &r.quat());
    }

    #[inline]
    fn hash_ang_vector(h: &mut StepHasher, w: Vec3A) {
        crate::hash::hash_vec3(h, &w);
    }
}

/// Deterministic unit vector orthogonal to `n`: cross against the world axis
/// with the smallest |component| of `n`.
fn orthonormal_axis(n: Vec3A) -> Vec3A {
    let a = n.abs();
    let base = if a.x <= a.y && a.x <= a.z {
        Vec3A::X
    } else if a.y <= a.z {
        Vec3A::Y
    } else {
        Vec3A::Z
    };
    base.cross(n).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_conventions_agree() {
        // 2D: cross(r, v) followed by ang_cross reproduces the triple product
        let r = Vec2::new(1.5, -0.5);
        let v = Vec2::new(0.25, 2.0);
        let w = Dim2::cross(r, v);
        // w k-hat x r is perpendicular to r and scales with w
        let back = Dim2::ang_cross(w, r);
        assert_relative_eq!(back.dot(r), 0.0, epsilon = 1e-5);

        // 3D matches glam
        let r3 = Vec3A::new(1.0, 2.0, 3.0);
        let v3 = Vec3A::new(-2.0, 0.5, 1.0);
        assert_eq!(Dim3::cross(r3, v3), r3.cross(v3));
    }

    #[test]
    fn box_inertia_formulas() {
        // 2D: m * |size|^2 / 12
        let i2 = Dim2::box_inertia(Vec2::new(0.5, 0.5), 3.0);
        assert_relative_eq!(i2, 3.0 * 2.0 / 12.0, epsilon = 1e-6);

        // 3D: diagonal box tensor
        let i3 = Dim3::box_inertia(Vec3A::new(0.5, 1.0, 1.5), 2.0);
        let c = 2.0 / 12.0;
        assert_relative_eq!(i3.col(0).x, c * (4.0 + 9.0), epsilon = 1e-5);
        assert_relative_eq!(i3.col(1).y, c * (1.0 + 9.0), epsilon = 1e-5);
        assert_relative_eq!(i3.col(2).z, c * (1.0 + 4.0), epsilon = 1e-5);
    }

    #[test]
    fn static_inertia_inverts_to_zero() {
        assert_eq!(Dim2::invert_inertia(&0.0), 0.0);
        assert_eq!(Dim3::invert_inertia(&Mat3A::ZERO), Mat3A::ZERO);
    }

    #[test]
    fn world_inv_inertia_is_similarity_transform() {
        let local = Dim3::invert_inertia(&Dim3::box_inertia(Vec3A::new(0.5, 1.0, 0.25), 1.0));
        let rot = Rot3::from_axis_angle(Vec3::Y, core::f32::consts::FRAC_PI_2);
        let world = Dim3::world_inv_inertia(&local, &rot);
        // Rotating a box 90 degrees around Y swaps the x and z diagonal terms
        assert_relative_eq!(world.col(0).x, local.col(2).z, epsilon = 1e-5);
        assert_relative_eq!(world.col(2).z, local.col(0).x, epsilon = 1e-5);
    }

    #[test]
    fn integrate_rot_2d_adds_angles() {
        let r = Rot2::new(0.2);
        let r2 = Dim2::integrate_rot(&r, 0.3);
        assert_relative_eq!(r2.angle(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn tangent_is_orthogonal_to_normal() {
        let n2 = Vec2::new(0.0, 1.0);
        assert_relative_eq!(Dim2::tangent(n2, Vec2::ZERO).dot(n2), 0.0);

        let n3 = Vec3A::new(0.0, 1.0, 0.0);
        let t = Dim3::tangent(n3, Vec3A::new(2.0, -1.0, 0.0));
        assert_relative_eq!(t.dot(n3), 0.0, epsilon = 1e-6);
        assert_relative_eq!(t.x, 1.0, epsilon = 1e-6);

        // Resting contact falls back to a deterministic basis axis
        let t0 = Dim3::tangent(n3, Vec3A::ZERO);
        assert_relative_eq!(t0.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(t0.dot(n3), 0.0, epsilon = 1e-6);
    }
}
