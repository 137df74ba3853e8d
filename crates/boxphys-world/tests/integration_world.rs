//! End-to-end tests for boxphys.
//!
//! These drive the public `World` API only. All scenarios run with a fixed
//! 1/60 step and are fully deterministic, so thresholds can be tight.

use approx::assert_relative_eq;
use boxphys_core::{BodyId, Quat, Rot2, Rot3, Scalar, Vec2, Vec3};
use boxphys_world::{Dim2, Dim3, World};

const DT: Scalar = 1.0 / 60.0;
const GRAVITY_2D: Vec2 = Vec2::new(0.0, -10.0);

fn world_2d() -> World<Dim2> {
    World::<Dim2>::new(GRAVITY_2D, 20, 10)
}

fn world_3d() -> World<Dim3> {
    World::<Dim3>::new(Vec3::new(0.0, -10.0, 0.0), 20, 10)
}

fn run(world: &mut World<Dim2>, steps: usize) {
    for _ in 0..steps {
        world.step(DT);
    }
}

fn run_3d(world: &mut World<Dim3>, steps: usize) {
    for _ in 0..steps {
        world.step(DT);
    }
}

fn add_floor(world: &mut World<Dim2>) -> BodyId {
    world
        .add_body(
            Vec2::new(100.0, 1.0),
            0.0,
            0.5,
            Vec2::new(0.0, -0.5),
            Rot2::default(),
        )
        .expect("floor fits")
}

// ============================================================================
// Scenario 1 — single dynamic box rests on a static floor
// ============================================================================

#[test]
fn box_comes_to_rest_on_floor() {
    let mut world = world_2d();
    add_floor(&mut world);
    let body = world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.0, 5.0), Rot2::default())
        .expect("box fits");

    run(&mut world, 600);

    let body = world.body(body);
    assert!(body.linear_velocity.y.abs() < 1e-2, "still moving: {:?}", body.linear_velocity);
    assert!(
        (0.499..=0.501).contains(&body.position.y),
        "resting height off: {}",
        body.position.y
    );
    assert!(body.rotation.angle().abs() < 0.01);
}

// ============================================================================
// Scenario 2 — two stacked boxes settle
// ============================================================================

#[test]
fn stacked_boxes_settle() {
    let mut world = world_2d();
    add_floor(&mut world);
    let a = world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.0, 1.0), Rot2::default())
        .expect("box fits");
    let b = world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.0, 2.0), Rot2::default())
        .expect("box fits");

    run(&mut world, 600);

    let (a, b) = (world.body(a), world.body(b));
    assert!((0.499..=0.52).contains(&a.position.y), "a.y = {}", a.position.y);
    assert!((1.499..=1.55).contains(&b.position.y), "b.y = {}", b.position.y);
    assert!(a.angular_velocity.abs() < 1e-2);
    assert!(b.angular_velocity.abs() < 1e-2);
}

// ============================================================================
// Scenarios 3 & 4 — friction on a 10 degree incline
// ============================================================================

/// Builds the incline scene and returns the box's displacement along the
/// downhill direction after 300 steps.
fn incline_slide_distance(friction: Scalar) -> Scalar {
    let angle = 10.0_f32.to_radians();
    let mut world = world_2d();
    world
        .add_body(
            Vec2::new(100.0, 1.0),
            0.0,
            friction,
            Vec2::ZERO,
            Rot2::new(angle),
        )
        .expect("incline fits");

    let rot = Rot2::new(angle);
    let start = rot.mat() * Vec2::new(0.0, 1.0005);
    let body = world
        .add_body(Vec2::ONE, 1.0, friction, start, rot)
        .expect("box fits");

    run(&mut world, 300);

    // Downhill points along the negative slope axis for a positive tilt.
    let downhill = -(rot.mat() * Vec2::X);
    (world.body(body).position - start).dot(downhill)
}

#[test]
fn high_friction_holds_the_box() {
    let slide = incline_slide_distance(0.9);
    assert!(slide.abs() < 0.1, "box crept {slide} along the slope");
}

#[test]
fn low_friction_lets_the_box_slide() {
    let slide = incline_slide_distance(0.05);
    assert!(slide > 2.0, "box only slid {slide}");
}

// ============================================================================
// Scenario 5 — warm-start impulses survive body storage growth
// ============================================================================

#[test]
fn manifold_impulses_survive_storage_growth() {
    // No pre-reserved capacity: the body vector reallocates as it grows.
    let mut world = World::<Dim2>::new(GRAVITY_2D, 20, 10);
    let floor = world
        .add_body(
            Vec2::new(100.0, 1.0),
            0.0,
            0.5,
            Vec2::new(0.0, -0.5),
            Rot2::default(),
        )
        .expect("floor fits");

    // Bodies 1..16 in a resting line on the floor.
    for i in 0..15 {
        world
            .add_body(
                Vec2::ONE,
                1.0,
                0.5,
                Vec2::new(i as f32 * 1.5 - 10.0, 0.499),
                Rot2::default(),
            )
            .expect("box fits");
    }

    // A few steps so the floor contacts accumulate real impulses.
    run(&mut world, 30);

    let probe = BodyId(3);
    let impulses_before: Vec<Scalar> = world
        .manifold(floor, probe)
        .expect("probe rests on the floor")
        .contacts()
        .iter()
        .map(|c| c.normal_impulse())
        .collect();
    assert!(impulses_before.iter().any(|&p| p > 0.0));

    // Growth: another 16 bodies, far away so they touch nothing.
    for i in 0..16 {
        world
            .add_body(
                Vec2::ONE,
                1.0,
                0.5,
                Vec2::new(i as f32 * 1.5 + 200.0, 5.0),
                Rot2::default(),
            )
            .expect("box fits");
    }

    // Index-keyed manifolds are untouched by the reallocation.
    let impulses_after: Vec<Scalar> = world
        .manifold(floor, probe)
        .expect("manifold survives growth")
        .contacts()
        .iter()
        .map(|c| c.normal_impulse())
        .collect();
    assert_eq!(impulses_before, impulses_after);

    // And the next step still warm-starts from them.
    world.step(DT);
    let manifold = world.manifold(floor, probe).expect("still in contact");
    assert!(manifold.contacts().iter().any(|c| c.normal_impulse() > 0.0));
}

// ============================================================================
// Scenario 6 — clear and refill behaves like a fresh world
// ============================================================================

#[test]
fn cleared_world_matches_a_fresh_one() {
    fn populate(world: &mut World<Dim2>) {
        world
            .add_body(
                Vec2::new(100.0, 1.0),
                0.0,
                0.5,
                Vec2::new(0.0, -0.5),
                Rot2::default(),
            )
            .expect("floor fits");
        for i in 0..5 {
            world
                .add_body(
                    Vec2::ONE,
                    1.0,
                    0.5,
                    Vec2::new(i as f32 * 0.4 - 1.0, 1.0 + i as f32),
                    Rot2::default(),
                )
                .expect("box fits");
        }
    }

    let mut used = world_2d();
    populate(&mut used);
    run(&mut used, 120);

    used.clear();
    assert_eq!(used.bodies().len(), 0);
    assert_eq!(used.manifolds().count(), 0);
    assert!(used.aabbs().is_empty());

    let mut fresh = world_2d();
    populate(&mut fresh);
    populate(&mut used);

    for step in 0..240 {
        used.step(DT);
        fresh.step(DT);
        assert_eq!(used.step_hash(), fresh.step_hash(), "diverged at step {step}");
    }
}

// ============================================================================
// Solver invariants observed through the public API
// ============================================================================

#[test]
fn impulses_respect_sign_and_friction_cone() {
    let mut world = world_2d();
    add_floor(&mut world);
    for i in 0..4 {
        world
            .add_body(
                Vec2::ONE,
                1.0,
                0.5,
                Vec2::new(0.1 * i as f32, 0.8 + 1.0 * i as f32),
                Rot2::default(),
            )
            .expect("box fits");
    }

    for _ in 0..300 {
        world.step(DT);
        for (_, manifold) in world.manifolds() {
            let friction = manifold.friction();
            for contact in manifold.contacts() {
                assert!(contact.normal_impulse() >= 0.0);
                assert!(
                    contact.tangent_impulse().abs()
                        <= friction * contact.normal_impulse() + 1e-5
                );
            }
        }
    }
}

#[test]
fn inelastic_contact_does_not_add_energy() {
    // Gravity off: two boxes drift into each other and collide.
    let mut world = World::<Dim2>::new(Vec2::ZERO, 20, 10);
    let a = world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(-0.45, 0.0), Rot2::default())
        .expect("box fits");
    let b = world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.45, 0.02), Rot2::default())
        .expect("box fits");
    world.body_mut(a).linear_velocity = Vec2::new(1.0, 0.0);
    world.body_mut(b).linear_velocity = Vec2::new(-1.0, 0.0);

    let energy = |world: &World<Dim2>| -> Scalar {
        world
            .bodies()
            .iter()
            .filter(|body| !body.is_static())
            .map(|body| {
                0.5 * body.mass * body.linear_velocity.length_squared()
                    + 0.5 * body.inertia * body.angular_velocity * body.angular_velocity
            })
            .sum()
    };

    let before = energy(&world);
    for _ in 0..60 {
        world.step(DT);
        assert!(energy(&world) <= before + 1e-4);
    }
    assert!(energy(&world) < before);
}

#[test]
fn static_bodies_never_move() {
    let mut world = world_2d();
    let floor = add_floor(&mut world);
    world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.0, 3.0), Rot2::default())
        .expect("box fits");

    run(&mut world, 300);

    let floor = world.body(floor);
    assert_eq!(floor.position, Vec2::new(0.0, -0.5));
    assert_eq!(floor.rotation.angle(), 0.0);
    assert_eq!(floor.linear_velocity, Vec2::ZERO);
    assert_eq!(floor.angular_velocity, 0.0);
}

// ============================================================================
// 3D: resting, stacking, determinism
// ============================================================================

#[test]
fn box_rests_on_floor_3d() {
    let mut world = world_3d();
    world
        .add_body(
            Vec3::new(100.0, 1.0, 100.0),
            0.0,
            0.5,
            Vec3::new(0.0, -0.5, 0.0),
            Rot3::default(),
        )
        .expect("floor fits");
    let body = world
        .add_body(
            Vec3::ONE,
            1.0,
            0.5,
            Vec3::new(0.0, 3.0, 0.0),
            Rot3::default(),
        )
        .expect("box fits");

    run_3d(&mut world, 600);

    let body = world.body(body);
    assert!(body.linear_velocity.length() < 1e-2);
    assert!(
        (0.499..=0.501).contains(&body.position.y),
        "resting height off: {}",
        body.position.y
    );
    // Still flat: the rotated up axis stays aligned with world up.
    let up = body.rotation.mat() * Vec3::Y;
    assert_relative_eq!(up.y, 1.0, epsilon = 1e-3);
}

#[test]
fn small_stack_settles_3d() {
    let mut world = world_3d();
    world
        .add_body(
            Vec3::new(50.0, 1.0, 50.0),
            0.0,
            0.6,
            Vec3::new(0.0, -0.5, 0.0),
            Rot3::default(),
        )
        .expect("floor fits");
    let a = world
        .add_body(
            Vec3::ONE,
            1.0,
            0.6,
            Vec3::new(0.0, 0.6, 0.0),
            Rot3::default(),
        )
        .expect("box fits");
    let b = world
        .add_body(
            Vec3::ONE,
            1.0,
            0.6,
            Vec3::new(0.05, 1.7, 0.05),
            Rot3::default(),
        )
        .expect("box fits");

    run_3d(&mut world, 600);

    let (a, b) = (world.body(a), world.body(b));
    assert!((0.48..=0.55).contains(&a.position.y), "a.y = {}", a.position.y);
    assert!((1.45..=1.6).contains(&b.position.y), "b.y = {}", b.position.y);
    assert!(a.linear_velocity.length() < 2e-2);
    assert!(b.linear_velocity.length() < 2e-2);
}

#[test]
fn identical_runs_hash_identically_3d() {
    fn build() -> World<Dim3> {
        let mut world = world_3d();
        world
            .add_body(
                Vec3::new(40.0, 1.0, 40.0),
                0.0,
                0.5,
                Vec3::new(0.0, -0.5, 0.0),
                Rot3::default(),
            )
            .expect("floor fits");
        for i in 0..6 {
            world
                .add_body(
                    Vec3::ONE,
                    1.0,
                    0.5,
                    Vec3::new(0.2 * i as f32, 1.0 + 1.1 * i as f32, -0.1 * i as f32),
                    Rot3::new(Quat::from_rotation_y(0.3 * i as f32)),
                )
                .expect("box fits");
        }
        world
    }

    let mut a = build();
    let mut b = build();
    for step in 0..240 {
        a.step(DT);
        b.step(DT);
        assert_eq!(a.step_hash(), b.step_hash(), "diverged at step {step}");
    }
}

// ============================================================================
// API edges
// ============================================================================

#[test]
#[should_panic]
fn zero_velocity_iterations_is_rejected() {
    let _ = World::<Dim2>::new(GRAVITY_2D, 0, 10);
}

#[test]
#[should_panic]
fn non_positive_dt_is_rejected() {
    let mut world = world_2d();
    world.step(0.0);
}

#[test]
fn iteration_setters_validate() {
    let mut world = world_2d();
    world.set_velocity_iterations(1);
    world.set_position_iterations(0);
    add_floor(&mut world);
    world
        .add_body(Vec2::ONE, 1.0, 0.5, Vec2::new(0.0, 2.0), Rot2::default())
        .expect("box fits");
    // Still simulates, just converges slower.
    run(&mut world, 60);
}
