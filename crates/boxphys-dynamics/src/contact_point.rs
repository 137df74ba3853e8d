use boxphys_collision::CollisionPoint;
use boxphys_core::{Dim, Scalar};
use boxphys_geom::Body;

/// Fraction of the residual penetration corrected per position iteration.
const POSITION_CORRECTION_FACTOR: Scalar = 0.2;

/// Penetration below this is left alone to avoid jitter.
const ALLOWED_PENETRATION: Scalar = 0.001;

/// One contact constraint between two bodies.
///
/// Wraps the narrow-phase collision point and carries the accumulated
/// impulses that survive across steps (warm starting), plus the quantities
/// precomputed once per step by `prepare_to_solve`.
#[derive(Copy, Clone, Debug)]
pub struct ContactPoint<D: Dim> {
    point: CollisionPoint<D>,
    tangent: D::Vector,
    offset_a: D::Vector,
    offset_b: D::Vector,
    normal_mass: Scalar,
    tangent_mass: Scalar,
    normal_impulse: Scalar,
    tangent_impulse: Scalar,
}

impl<D: Dim> ContactPoint<D> {
    pub fn new(point: CollisionPoint<D>) -> Self {
        Self {
            point,
            tangent: D::Vector::default(),
            offset_a: D::Vector::default(),
            offset_b: D::Vector::default(),
            normal_mass: 0.0,
            tangent_mass: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        }
    }

    #[inline]
    pub fn point(&self) -> &CollisionPoint<D> {
        &self.point
    }

    #[inline]
    pub fn normal_impulse(&self) -> Scalar {
        self.normal_impulse
    }

    #[inline]
    pub fn tangent_impulse(&self) -> Scalar {
        self.tangent_impulse
    }

    /// Carries the accumulated impulses over from a previous-step contact
    /// with the same feature pair.
    pub fn update_from(&mut self, other: &ContactPoint<D>) {
        self.normal_impulse = other.normal_impulse;
        self.tangent_impulse = other.tangent_impulse;
    }

    /// Precomputes offsets, tangent and effective masses, then applies the
    /// warm-start impulse.
    pub fn prepare_to_solve(
        &mut self,
        body_a: &mut Body<D>,
        body_b: &mut Body<D>,
        inv_inertia_a: &D::Inertia,
        inv_inertia_b: &D::Inertia,
    ) {
        self.offset_a = self.point.position - body_a.position;
        self.offset_b = self.point.position - body_b.position;

        self.normal_mass = effective_mass(
            body_a,
            body_b,
            inv_inertia_a,
            inv_inertia_b,
            self.offset_a,
            self.offset_b,
            self.point.normal,
        );

        let rel_vel = self.velocity_at_contact(body_a, body_b);
        self.tangent = D::tangent(self.point.normal, rel_vel);
        self.tangent_mass = effective_mass(
            body_a,
            body_b,
            inv_inertia_a,
            inv_inertia_b,
            self.offset_a,
            self.offset_b,
            self.tangent,
        );

        let warm_start =
            self.point.normal * self.normal_impulse + self.tangent * self.tangent_impulse;
        self.apply_impulse(body_a, body_b, inv_inertia_a, inv_inertia_b, warm_start);
    }

    /// One projected Gauss-Seidel iteration: normal impulse clamped to stay
    /// non-negative, then dry friction clamped to the cone of the current
    /// accumulated normal impulse.
    pub fn solve_velocities(
        &mut self,
        body_a: &mut Body<D>,
        body_b: &mut Body<D>,
        inv_inertia_a: &D::Inertia,
        inv_inertia_b: &D::Inertia,
        friction: Scalar,
    ) {
        debug_assert!((0.0..=1.0).contains(&friction));

        // Normal impulse
        {
            let impulse = -self.normal_mass
                * D::dot(self.velocity_at_contact(body_a, body_b), self.point.normal);

            let old_impulse = self.normal_impulse;
            self.normal_impulse = (old_impulse + impulse).max(0.0);
            self.apply_impulse(
                body_a,
                body_b,
                inv_inertia_a,
                inv_inertia_b,
                self.point.normal * (self.normal_impulse - old_impulse),
            );
        }

        // Dry friction impulse
        {
            let max_friction = friction * self.normal_impulse;

            let impulse = -self.tangent_mass
                * D::dot(self.velocity_at_contact(body_a, body_b), self.tangent);

            let old_impulse = self.tangent_impulse;
            self.tangent_impulse = (old_impulse + impulse).clamp(-max_friction, max_friction);
            self.apply_impulse(
                body_a,
                body_b,
                inv_inertia_a,
                inv_inertia_b,
                self.tangent * (self.tangent_impulse - old_impulse),
            );
        }
    }

    /// One position-correction iteration.
    ///
    /// The contact is reconstructed from the persisted local-frame data
    /// against the current poses, so corrections stay valid after the
    /// integrator and earlier iterations have moved the bodies. The result
    /// is applied straight to positions and orientations.
    pub fn solve_positions(&mut self, body_a: &mut Body<D>, body_b: &mut Body<D>) {
        let clip = self.point.clip_box as usize;
        let other = 1 - clip;

        let positions = [body_a.position, body_b.position];
        let matrices = [
            D::rot_matrix(&body_a.rotation),
            D::rot_matrix(&body_b.rotation),
        ];

        let clipped_point =
            positions[other] + D::mat_mul_vec(&matrices[other], self.point.local_points[other]);
        let plane_point =
            positions[clip] + D::mat_mul_vec(&matrices[clip], self.point.local_points[clip]);
        let clip_normal = D::mat_mul_vec(&matrices[clip], self.point.local_normal);
        let penetration = D::dot(plane_point - clipped_point, clip_normal);

        let bias = POSITION_CORRECTION_FACTOR * (penetration - ALLOWED_PENETRATION).max(0.0);
        if bias <= 0.0 {
            return;
        }

        // Normal must point from A to B.
        let normal = if clip == 0 { clip_normal } else { -clip_normal };

        let offset_a = clipped_point - body_a.position;
        let offset_b = clipped_point - body_b.position;
        let inv_inertia_a = body_a.world_inv_inertia();
        let inv_inertia_b = body_b.world_inv_inertia();

        let mass = effective_mass(
            body_a,
            body_b,
            &inv_inertia_a,
            &inv_inertia_b,
            offset_a,
            offset_b,
            normal,
        );

        let impulse = normal * (bias * mass).max(0.0);
        body_a.apply_position_impulse(&inv_inertia_a, offset_a, -impulse);
        body_b.apply_position_impulse(&inv_inertia_b, offset_b, impulse);
    }

    #[inline]
    fn velocity_at_contact(&self, body_a: &Body<D>, body_b: &Body<D>) -> D::Vector {
        body_b.velocity_at(self.offset_b) - body_a.velocity_at(self.offset_a)
    }

    #[inline]
    fn apply_impulse(
        &self,
        body_a: &mut Body<D>,
        body_b: &mut Body<D>,
        inv_inertia_a: &D::Inertia,
        inv_inertia_b: &D::Inertia,
        impulse: D::Vector,
    ) {
        body_a.apply_impulse(inv_inertia_a, self.offset_a, -impulse);
        body_b.apply_impulse(inv_inertia_b, self.offset_b, impulse);
    }
}

/// `1 / (imA + imB + u_A . I_A^-1 u_A + u_B . I_B^-1 u_B)` with
/// `u = cross(offset, direction)`. Safe to divide: the broad phase never
/// reports static-static pairs, so at least one inverse mass is nonzero.
fn effective_mass<D: Dim>(
    body_a: &Body<D>,
    body_b: &Body<D>,
    inv_inertia_a: &D::Inertia,
    inv_inertia_b: &D::Inertia,
    offset_a: D::Vector,
    offset_b: D::Vector,
    direction: D::Vector,
) -> Scalar {
    let u_a = D::cross(offset_a, direction);
    let u_b = D::cross(offset_b, direction);
    let inv_mass = body_a.inv_mass
        + body_b.inv_mass
        + D::ang_dot(D::apply_inertia(inv_inertia_a, u_a), u_a)
        + D::ang_dot(D::apply_inertia(inv_inertia_b, u_b), u_b);
    1.0 / inv_mass
}
