use boxphys_core::{Rot2, Vec2};
use boxphys_world::{Dim2, WorldBuilder};

fn main() {
    let mut world = WorldBuilder::<Dim2>::new(Vec2::new(0.0, -10.0))
        .iterations(20, 10)
        .with_capacity(64)
        .build();

    world
        .add_body(
            Vec2::new(20.0, 1.0),
            0.0,
            0.5,
            Vec2::new(0.0, -0.5),
            Rot2::default(),
        )
        .expect("floor");

    for i in 0..8 {
        world
            .add_body(
                Vec2::new(1.0, 1.0),
                1.0,
                0.5,
                Vec2::new(0.3 * (i % 3) as f32 - 0.3, 1.0 + 1.2 * i as f32),
                Rot2::new(0.1 * i as f32),
            )
            .expect("box");
    }

    for step in 0..240 {
        let stats = world.step(1.0 / 60.0);
        if step % 30 == 0 {
            let hash = world.step_hash();
            println!(
                "step {step:3}  pairs={:2}  contacts={:2}  manifolds={:2}  hash={:02x}{:02x}{:02x}{:02x}",
                stats.pairs_tested, stats.contacts, stats.manifolds, hash[0], hash[1], hash[2], hash[3]
            );
        }
    }

    for (i, body) in world.bodies().iter().enumerate() {
        println!(
            "body {i}: pos=({:+.3}, {:+.3})  angle={:+.3}",
            body.position.x,
            body.position.y,
            body.rotation.angle()
        );
    }
}
