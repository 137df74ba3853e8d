use boxphys_core::{Dim, Scalar};

/// Box-shaped rigid body.
///
/// Shape, mass properties and friction are fixed at construction; only the
/// pose and velocities change afterwards. A `mass` of zero marks the body as
/// static: both inverse mass and inverse inertia are zero, so no impulse or
/// correction can ever move it.
#[derive(Copy, Clone, Debug)]
pub struct Body<D: Dim> {
    /// Half extents along each local axis.
    pub half_size: D::Vector,

    /// Mass (0 for static bodies).
    pub mass: Scalar,

    /// Inverse mass (0 for static bodies).
    pub inv_mass: Scalar,

    /// Moment of inertia about the center of mass, local frame.
    pub inertia: D::Inertia,

    /// Inverse inertia, local frame (0 for static bodies).
    pub inv_inertia: D::Inertia,

    /// Friction coefficient in [0, 1].
    pub friction: Scalar,

    /// World-space center of mass.
    pub position: D::Vector,

    /// Orientation; carries a cached rotation matrix.
    pub rotation: D::Rotation,

    pub linear_velocity: D::Vector,

    pub angular_velocity: D::AngVector,
}

impl<D: Dim> Body<D> {
    /// Builds a body from its full size.
    ///
    /// Asserts: every size component > 0, `mass >= 0`, `friction` in [0, 1].
    pub fn new(size: D::Vector, mass: Scalar, friction: Scalar) -> Self {
        for i in 0..D::AXES {
            assert!(D::axis(size, i) > 0.0, "box size must be positive");
        }
        assert!(mass >= 0.0);
        assert!((0.0..=1.0).contains(&friction));

        let half_size = size * 0.5;
        let inertia = D::box_inertia(half_size, mass);
        let (inv_mass, inv_inertia) = if mass == 0.0 {
            (0.0, D::inertia_zero())
        } else {
            (1.0 / mass, D::invert_inertia(&inertia))
        };

        Self {
            half_size,
            mass,
            inv_mass,
            inertia,
            inv_inertia,
            friction,
            position: D::Vector::default(),
            rotation: D::Rotation::default(),
            linear_velocity: D::Vector::default(),
            angular_velocity: D::AngVector::default(),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// World-frame inverse inertia for the current orientation.
    #[inline]
    pub fn world_inv_inertia(&self) -> D::Inertia {
        D::world_inv_inertia(&self.inv_inertia, &self.rotation)
    }

    /// Relative velocity of the material point at `offset` from the center.
    #[inline]
    pub fn velocity_at(&self, offset: D::Vector) -> D::Vector {
        self.linear_velocity + D::ang_cross(self.angular_velocity, offset)
    }

    /// Applies an impulse at `offset` from the center of mass.
    ///
    /// `inv_inertia_world` is passed in because callers already hold it for
    /// the duration of a solver pass.
    #[inline]
    pub fn apply_impulse(
        &mut self,
        inv_inertia_world: &D::Inertia,
        offset: D::Vector,
        impulse: D::Vector,
    ) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += D::apply_inertia(inv_inertia_world, D::cross(offset, impulse));
    }

    /// Applies a pseudo-impulse directly to the pose, leaving velocities
    /// untouched (position solver).
    #[inline]
    pub fn apply_position_impulse(
        &mut self,
        inv_inertia_world: &D::Inertia,
        offset: D::Vector,
        impulse: D::Vector,
    ) {
        self.position += impulse * self.inv_mass;
        let dtheta = D::apply_inertia(inv_inertia_world, D::cross(offset, impulse));
        self.rotation = D::integrate_rot(&self.rotation, dtheta);
    }
}
