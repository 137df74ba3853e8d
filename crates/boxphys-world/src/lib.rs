use boxphys_collision::{collide_bodies, BroadPhase, CollisionManifold, NarrowPhaseDim};
use boxphys_core::{BodyId, Dim, Scalar, StepHasher, StepStage, StepStats};
use boxphys_dynamics::{ContactManifold, ContactSolver};
use boxphys_geom::{Aabb, Body};
use boxphys_viz::{DebugSettings, Ledger, LedgerEvent, ScheduleRecorder};

pub use boxphys_core::{Dim2, Dim3, Rot2, Rot3};

/* ---------------- Builder ---------------- */

pub struct WorldBuilder<D: NarrowPhaseDim> {
    gravity: D::Vector,
    velocity_iterations: u32,
    position_iterations: u32,
    capacity: usize,
}

impl<D: NarrowPhaseDim> WorldBuilder<D> {
    pub fn new(gravity: D::Vector) -> Self {
        Self {
            gravity,
            velocity_iterations: 8,
            position_iterations: 3,
            capacity: 128,
        }
    }

    pub fn iterations(mut self, velocity: u32, position: u32) -> Self {
        self.velocity_iterations = velocity;
        self.position_iterations = position;
        self
    }

    pub fn with_capacity(mut self, bodies: usize) -> Self {
        self.capacity = bodies;
        self
    }

    pub fn build(self) -> World<D> {
        let mut world = World::new(
            self.gravity,
            self.velocity_iterations,
            self.position_iterations,
        );
        world.reserve(self.capacity);
        world
    }
}

/* ---------------- World ---------------- */

/// Top-level simulation driver: owns the bodies, the broad phase and the
/// contact solver, and orchestrates one fixed step at a time.
pub struct World<D: NarrowPhaseDim> {
    gravity: D::Vector,
    velocity_iterations: u32,
    position_iterations: u32,

    bodies: Vec<Body<D>>,
    broad_phase: BroadPhase<D>,
    solver: ContactSolver<D>,

    schedule: ScheduleRecorder,
    debug: DebugSettings,
    ledger: Ledger,
    tick: u64,
}

impl<D: NarrowPhaseDim> World<D> {
    /// Asserts `velocity_iterations >= 1`.
    pub fn new(gravity: D::Vector, velocity_iterations: u32, position_iterations: u32) -> Self {
        assert!(velocity_iterations >= 1);
        Self {
            gravity,
            velocity_iterations,
            position_iterations,
            bodies: Vec::new(),
            broad_phase: BroadPhase::new(),
            solver: ContactSolver::new(),
            schedule: ScheduleRecorder::new(),
            debug: DebugSettings::default(),
            ledger: Ledger::new(4096),
            tick: 0,
        }
    }

    /* ---------- Composition ---------- */

    pub fn reserve(&mut self, count: usize) {
        self.bodies.reserve(count);
    }

    /// Appends a body and returns its id, or `None` once the u32 index space
    /// is exhausted. Nothing is mutated in the `None` case.
    pub fn add_body(
        &mut self,
        size: D::Vector,
        mass: Scalar,
        friction: Scalar,
        position: D::Vector,
        rotation: D::Rotation,
    ) -> Option<BodyId> {
        if self.bodies.len() >= u32::MAX as usize {
            return None;
        }
        let id = BodyId(self.bodies.len() as u32);
        let mut body = Body::new(size, mass, friction);
        body.position = position;
        body.rotation = rotation;
        self.bodies.push(body);
        Some(id)
    }

    /// Drops every body and the whole manifold cache.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.broad_phase.clear();
        self.solver.clear();
    }

    /* ---------- Accessors ---------- */

    #[inline]
    pub fn gravity(&self) -> D::Vector {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: D::Vector) {
        self.gravity = gravity;
    }

    /// Asserts `n >= 1`.
    pub fn set_velocity_iterations(&mut self, n: u32) {
        assert!(n >= 1);
        self.velocity_iterations = n;
    }

    pub fn set_position_iterations(&mut self, n: u32) {
        self.position_iterations = n;
    }

    #[inline]
    pub fn bodies(&self) -> &[Body<D>] {
        &self.bodies
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> &Body<D> {
        &self.bodies[id.index()]
    }

    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body<D> {
        &mut self.bodies[id.index()]
    }

    /// Broad-phase AABBs from the last step, for visualization.
    #[inline]
    pub fn aabbs(&self) -> &[Aabb<D>] {
        self.broad_phase.aabbs()
    }

    /// Live manifolds with their pair keys.
    pub fn manifolds(&self) -> impl Iterator<Item = (u64, &ContactManifold<D>)> {
        self.solver.manifolds()
    }

    pub fn manifold(&self, body_a: BodyId, body_b: BodyId) -> Option<&ContactManifold<D>> {
        self.solver.manifold(body_a.0, body_b.0)
    }

    pub fn set_debug(&mut self, debug: DebugSettings) {
        self.debug = debug;
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /* ---------- Step ---------- */

    /// Advances the simulation by `dt` seconds (asserted > 0).
    pub fn step(&mut self, dt: Scalar) -> StepStats {
        assert!(dt > 0.0);
        self.tick = self.tick.wrapping_add(1);
        self.schedule.clear();
        self.ledger.clear();

        // Gravity. Static bodies have no velocity to accumulate.
        self.schedule.push(StepStage::ApplyGravity);
        for body in &mut self.bodies {
            if !body.is_static() {
                body.linear_velocity += self.gravity * dt;
            }
        }

        // Collision detection feeding the manifold cache. The narrow phase
        // runs inside the broad-phase sweep callback.
        self.solver.prepare_manifolds_update();
        self.schedule.push(StepStage::BroadPhase);
        self.schedule.push(StepStage::NarrowPhase);

        let mut pairs_tested = 0u32;
        let mut contacts = 0u32;
        {
            let Self {
                ref bodies,
                ref mut broad_phase,
                ref mut solver,
                ref mut ledger,
                ..
            } = *self;

            broad_phase.update(bodies, |a, b| {
                pairs_tested += 1;

                let mut collision = CollisionManifold::new(a, b);
                collide_bodies(
                    &bodies[a as usize],
                    &bodies[b as usize],
                    &mut collision.points,
                );
                if collision.points.is_empty() {
                    return;
                }

                contacts += collision.points.len() as u32;
                let max_penetration = collision
                    .points
                    .iter()
                    .map(|p| p.penetration)
                    .fold(0.0, Scalar::max);
                ledger.push(LedgerEvent::ContactBegin {
                    a,
                    b,
                    points: collision.points.len() as u32,
                    max_penetration,
                });

                solver.on_collision(&collision, bodies);
            });
        }
        self.solver.finish_manifolds_update();

        // Velocity solve with warm starting.
        self.schedule.push(StepStage::PrepareSolve);
        self.solver.prepare_to_solve(&mut self.bodies);

        self.schedule.push(StepStage::SolveVelocities);
        self.solver
            .solve_velocities(&mut self.bodies, self.velocity_iterations);

        for (_, manifold) in self.solver.manifolds() {
            let mut normal = 0.0;
            let mut tangent = 0.0;
            for contact in manifold.contacts() {
                normal += contact.normal_impulse();
                tangent += contact.tangent_impulse();
            }
            self.ledger.push(LedgerEvent::ManifoldImpulse {
                a: manifold.body_a(),
                b: manifold.body_b(),
                normal,
                tangent,
            });
        }

        // Integrate, then let the position solver clean up the residual
        // penetration of the already-advanced poses.
        self.schedule.push(StepStage::Integrate);
        for (id, body) in self.bodies.iter_mut().enumerate() {
            if body.is_static() {
                continue;
            }
            body.position += body.linear_velocity * dt;
            body.rotation = D::integrate_rot(&body.rotation, body.angular_velocity * dt);
            self.ledger.push(LedgerEvent::Integrate {
                id: id as u32,
                position: vector_as_array::<D>(body.position),
            });
        }

        self.schedule.push(StepStage::SolvePositions);
        self.solver
            .solve_positions(&mut self.bodies, self.position_iterations);

        if self.debug.print_every != 0 && (self.tick as u32) % self.debug.print_every == 0 {
            self.print_debug_block();
            let _ = self.ledger.write_jsonl("out", self.tick);
        }

        StepStats {
            pairs_tested,
            contacts,
            manifolds: self.solver.len() as u32,
        }
    }

    /// Blake3 digest of the schedule and all body state; two worlds that
    /// behave identically hash identically.
    pub fn step_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.update_bytes(&self.schedule.digest());
        for (i, body) in self.bodies.iter().enumerate() {
            h.update_bytes(&(i as u32).to_le_bytes());
            D::hash_vector(&mut h, body.position);
            D::hash_rotation(&mut h, &body.rotation);
            D::hash_vector(&mut h, body.linear_velocity);
            D::hash_ang_vector(&mut h, body.angular_velocity);
        }
        h.finalize()
    }

    /* ---------- Debug printer ---------- */

    fn print_debug_block(&self) {
        println!("--- debug @ tick {} ---", self.tick);

        if self.debug.show_energy {
            let mut kinetic = 0.0;
            for body in &self.bodies {
                if !body.is_static() {
                    kinetic +=
                        0.5 * body.mass * D::length_squared(body.linear_velocity);
                }
            }
            println!("energy: linear KE = {kinetic:.6}");
        }

        if self.debug.show_bodies {
            for (i, body) in self.bodies.iter().take(self.debug.max_lines).enumerate() {
                println!(
                    "body {:3}  pos={:?}  vel={:?}",
                    i, body.position, body.linear_velocity
                );
            }
        }

        if self.debug.show_contacts {
            let mut lines = 0;
            for (_, manifold) in self.solver.manifolds() {
                println!(
                    "manifold {}-{}  contacts={}  friction={:.3}",
                    manifold.body_a(),
                    manifold.body_b(),
                    manifold.contacts().len(),
                    manifold.friction()
                );
                lines += 1;
                if lines >= self.debug.max_lines {
                    break;
                }
            }
        }
    }
}

/// Pads a 2D or 3D vector to three ledger components.
fn vector_as_array<D: Dim>(v: D::Vector) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (i, slot) in out.iter_mut().enumerate().take(D::AXES) {
        *slot = D::axis(v, i);
    }
    out
}
