use boxphys_collision::CollisionManifold;
use boxphys_core::{Dim, Scalar};
use boxphys_geom::Body;
use smallvec::SmallVec;

use crate::contact_point::ContactPoint;

/// Persistent contact manifold between two bodies.
///
/// Survives across steps while the pair keeps colliding and exploits
/// temporal coherence: contacts whose feature pairs reappear keep their
/// accumulated impulses. Bodies are referenced by index, so growing the
/// world's body storage never invalidates a manifold.
#[derive(Clone, Debug)]
pub struct ContactManifold<D: Dim> {
    body_a: u32,
    body_b: u32,
    contacts: SmallVec<[ContactPoint<D>; 8]>,
    /// Pair friction, fixed when the manifold is created.
    friction: Scalar,
    obsolete: bool,
    /// World-frame inverse inertia, cached by `prepare_to_solve` for the
    /// velocity iterations of the current step.
    inv_inertia_world: [D::Inertia; 2],
}

impl<D: Dim> ContactManifold<D> {
    /// Builds a manifold from the first collision of a pair.
    pub fn new(collision: &CollisionManifold<D>, bodies: &[Body<D>]) -> Self {
        assert!(!collision.points.is_empty());
        assert!(collision.points.len() <= D::MAX_POINTS);

        let body_a = &bodies[collision.body_a as usize];
        let body_b = &bodies[collision.body_b as usize];

        Self {
            body_a: collision.body_a,
            body_b: collision.body_b,
            contacts: collision
                .points
                .iter()
                .map(|point| ContactPoint::new(*point))
                .collect(),
            // A well-known approximation for friction between two materials
            friction: (body_a.friction * body_b.friction).sqrt(),
            obsolete: false,
            inv_inertia_world: [D::inertia_zero(), D::inertia_zero()],
        }
    }

    #[inline]
    pub fn body_a(&self) -> u32 {
        self.body_a
    }

    #[inline]
    pub fn body_b(&self) -> u32 {
        self.body_b
    }

    #[inline]
    pub fn contacts(&self) -> &[ContactPoint<D>] {
        &self.contacts
    }

    #[inline]
    pub fn friction(&self) -> Scalar {
        self.friction
    }

    #[inline]
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    #[inline]
    pub fn mark_obsolete(&mut self) {
        self.obsolete = true;
    }

    /// Replaces the contact set with this step's collision points, keeping
    /// the accumulated impulses of contacts whose feature pair matches.
    pub fn update(&mut self, collision: &CollisionManifold<D>) {
        debug_assert_eq!(self.body_a, collision.body_a);
        debug_assert_eq!(self.body_b, collision.body_b);

        let old_contacts = core::mem::take(&mut self.contacts);

        self.contacts = collision
            .points
            .iter()
            .map(|point| ContactPoint::new(*point))
            .collect();

        for contact in &mut self.contacts {
            if let Some(old) = old_contacts
                .iter()
                .find(|old| old.point().feature_pair == contact.point().feature_pair)
            {
                contact.update_from(old);
            }
        }
        self.obsolete = false;
    }

    pub fn prepare_to_solve(&mut self, bodies: &mut [Body<D>]) {
        let (body_a, body_b) = pair_mut(bodies, self.body_a, self.body_b);
        let inv_inertia_a = body_a.world_inv_inertia();
        let inv_inertia_b = body_b.world_inv_inertia();
        self.inv_inertia_world = [inv_inertia_a, inv_inertia_b];

        for contact in &mut self.contacts {
            contact.prepare_to_solve(body_a, body_b, &inv_inertia_a, &inv_inertia_b);
        }
    }

    pub fn solve_velocities(&mut self, bodies: &mut [Body<D>]) {
        let (body_a, body_b) = pair_mut(bodies, self.body_a, self.body_b);
        let [inv_inertia_a, inv_inertia_b] = self.inv_inertia_world;
        for contact in &mut self.contacts {
            contact.solve_velocities(
                body_a,
                body_b,
                &inv_inertia_a,
                &inv_inertia_b,
                self.friction,
            );
        }
    }

    pub fn solve_positions(&mut self, bodies: &mut [Body<D>]) {
        let (body_a, body_b) = pair_mut(bodies, self.body_a, self.body_b);
        for contact in &mut self.contacts {
            contact.solve_positions(body_a, body_b);
        }
    }
}

/// Disjoint mutable borrows of an ordered body pair.
fn pair_mut<D: Dim>(bodies: &mut [Body<D>], a: u32, b: u32) -> (&mut Body<D>, &mut Body<D>) {
    debug_assert!(a < b);
    let (head, tail) = bodies.split_at_mut(b as usize);
    (&mut head[a as usize], &mut tail[0])
}
