use glam::{Mat3A, Quat, Vec2 as GVec2, Vec3A};

use crate::Scalar;

pub type Vec2 = GVec2;
pub type Vec3 = Vec3A;
pub type Mat2 = glam::Mat2;
pub type Mat3 = Mat3A;

#[inline]
pub fn vec2(x: Scalar, y: Scalar) -> Vec2 {
    Vec2::new(x, y)
}

#[inline]
pub fn vec3(x: Scalar, y: Scalar, z: Scalar) -> Vec3 {
    Vec3::new(x, y, z)
}

/// 2D rotation: angle plus the cached rotation matrix.
///
/// The matrix is refreshed on every mutation so that readers never observe
/// a stale pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rot2 {
    angle: Scalar,
    mat: Mat2,
}

impl Rot2 {
    #[inline]
    pub fn new(angle: Scalar) -> Self {
        Self {
            angle,
            mat: Mat2::from_angle(angle),
        }
    }

    #[inline]
    pub fn angle(&self) -> Scalar {
        self.angle
    }

    #[inline]
    pub fn set_angle(&mut self, angle: Scalar) {
        self.angle = angle;
        self.mat = Mat2::from_angle(angle);
    }

    #[inline]
    pub fn mat(&self) -> Mat2 {
        self.mat
    }

    /// Inverse rotation matrix (the transpose, since the matrix is orthonormal).
    #[inline]
    pub fn inverse_mat(&self) -> Mat2 {
        self.mat.transpose()
    }
}

impl Default for Rot2 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// 3D rotation: unit quaternion plus the cached rotation matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rot3 {
    quat: Quat,
    mat: Mat3A,
}

impl Rot3 {
    /// Normalizes the input so the cached matrix is always orthonormal.
    #[inline]
    pub fn new(quat: Quat) -> Self {
        let quat = quat.normalize();
        Self {
            quat,
            mat: Mat3A::from_quat(quat),
        }
    }

    #[inline]
    pub fn from_axis_angle(axis: glam::Vec3, angle: Scalar) -> Self {
        Self::new(Quat::from_axis_angle(axis.normalize(), angle))
    }

    #[inline]
    pub fn quat(&self) -> Quat {
        self.quat
    }

    #[inline]
    pub fn set_quat(&mut self, quat: Quat) {
        self.quat = quat.normalize();
        self.mat = Mat3A::from_quat(self.quat);
    }

    #[inline]
    pub fn mat(&self) -> Mat3A {
        self.mat
    }

    #[inline]
    pub fn inverse_mat(&self) -> Mat3A {
        self.mat.transpose()
    }
}

impl Default for Rot3 {
    fn default() -> Self {
        Self::new(Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rot2_matrix_tracks_angle() {
        let mut r = Rot2::new(0.3);
        assert_relative_eq!(r.mat().x_axis.x, 0.3f32.cos(), epsilon = 1e-6);
        r.set_angle(-1.1);
        assert_relative_eq!(r.mat().x_axis.y, (-1.1f32).sin(), epsilon = 1e-6);
        // Orthonormal: R * R^T = I
        let id = r.mat() * r.inverse_mat();
        assert_relative_eq!(id.x_axis.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(id.x_axis.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rot3_normalizes_and_caches() {
        let r = Rot3::new(Quat::from_xyzw(0.0, 2.0, 0.0, 0.0));
        assert_relative_eq!(r.quat().length(), 1.0, epsilon = 1e-6);
        let v = r.mat() * Vec3::new(1.0, 0.0, 0.0);
        // 180 degrees around Y maps +x to -x
        assert_relative_eq!(v.x, -1.0, epsilon = 1e-6);
    }
}
