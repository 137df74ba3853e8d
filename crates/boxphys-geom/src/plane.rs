use boxphys_core::{Dim, Scalar};

/// Hyperplane given by a unit normal and an offset from the origin.
#[derive(Copy, Clone, Debug)]
pub struct Plane<D: Dim> {
    pub normal: D::Vector,
    pub offset: Scalar,
}

impl<D: Dim> Plane<D> {
    #[inline]
    pub fn new(normal: D::Vector, offset: Scalar) -> Self {
        debug_assert!((D::length_squared(normal) - 1.0).abs() < 1.0e-4);
        Self { normal, offset }
    }

    /// Plane through `origin` with the given normal.
    #[inline]
    pub fn from_point(normal: D::Vector, origin: D::Vector) -> Self {
        Self::new(normal, D::dot(normal, origin))
    }

    /// Plane through `origin` shifted `extra` along the normal.
    #[inline]
    pub fn from_point_offset(normal: D::Vector, origin: D::Vector, extra: Scalar) -> Self {
        Self::new(normal, D::dot(normal, origin) + extra)
    }

    /// Signed distance; positive on the normal side.
    #[inline]
    pub fn distance(&self, point: D::Vector) -> Scalar {
        D::dot(self.normal, point) - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use boxphys_core::{Dim2, Vec2};

    #[test]
    fn signed_distance() {
        let p = Plane::<Dim2>::from_point_offset(Vec2::Y, Vec2::new(3.0, 1.0), 0.5);
        assert_relative_eq!(p.distance(Vec2::new(0.0, 1.5)), 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.distance(Vec2::new(-2.0, 3.0)), 1.5, epsilon = 1e-6);
        assert!(p.distance(Vec2::ZERO) < 0.0);
    }
}
