//! Deterministic regression harness.
//!
//! Fills a static "glass" with a grid of pseudo-randomly sized boxes, steps
//! the world at 60 Hz and dumps body poses as JSONL at a fixed cadence. Two
//! runs of the same build must produce byte-identical output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use boxphys_core::{Rot2, Vec2, XorShift64};
use boxphys_world::{Dim2, World};

const TIME_STEP: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(about = "Run the glass scene and dump body poses as JSONL")]
struct Args {
    /// Output file path.
    #[arg(short, long, default_value = "results.jsonl")]
    out: PathBuf,

    /// Number of simulation steps.
    #[arg(long, default_value_t = 400)]
    steps: u32,

    /// Dump body poses every N steps.
    #[arg(long, default_value_t = 10)]
    dump_interval: u32,

    /// RNG seed for the box grid.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Box rows in the grid.
    #[arg(long, default_value_t = 100)]
    rows: u32,

    /// Box columns in the grid.
    #[arg(long, default_value_t = 20)]
    columns: u32,
}

#[derive(Serialize)]
struct PoseRow {
    step: u32,
    body: u32,
    x: f32,
    y: f32,
    angle: f32,
}

/// A glass with bottom size 25 and two walls twice as high, filled with a
/// grid of boxes randomized in size, mass and friction.
fn create_test_scene(world: &mut World<Dim2>, args: &Args) -> Result<()> {
    const BOTTOM_SIZE: f32 = 25.0;
    const BOTTOM_THICKNESS: f32 = 5.0;
    const BOX_BOTTOM_RATIO: f32 = 1.0 / 15.0;
    const FRICTION: f32 = 0.5;

    // Bottom
    world
        .add_body(
            Vec2::new(BOTTOM_SIZE + 2.0 * BOTTOM_THICKNESS, BOTTOM_THICKNESS),
            0.0,
            FRICTION,
            Vec2::new(0.0, -BOTTOM_THICKNESS * 0.5),
            Rot2::default(),
        )
        .context("adding glass bottom")?;

    // Sides
    for side in [-1.0f32, 1.0] {
        world
            .add_body(
                Vec2::new(BOTTOM_THICKNESS, BOTTOM_SIZE * 2.0),
                0.0,
                FRICTION,
                Vec2::new(side * (BOTTOM_SIZE + BOTTOM_THICKNESS) * 0.5, BOTTOM_SIZE),
                Rot2::default(),
            )
            .context("adding glass side")?;
    }

    let mut rng = XorShift64::new(args.seed);
    let cell = Vec2::splat(BOTTOM_SIZE * 0.5 * BOX_BOTTOM_RATIO);
    let start_y = cell.y * 4.0;
    let start_x = -((args.columns - 1) as f32 * cell.x) / 2.0;

    for row in 0..args.rows {
        for col in 0..args.columns {
            let size = Vec2::new(
                cell.x * rng.next_range(0.5, 1.0),
                cell.y * rng.next_range(0.5, 1.0),
            );
            let mass = size.x * size.y * 1000.0;
            let friction = 0.4 + 0.2 * rng.next_range(0.5, 1.0);

            world
                .add_body(
                    size,
                    mass,
                    friction,
                    Vec2::new(
                        start_x + col as f32 * cell.x,
                        start_y + row as f32 * cell.y,
                    ),
                    Rot2::default(),
                )
                .with_context(|| format!("adding box at row {row}, column {col}"))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut world = World::<Dim2>::new(Vec2::new(0.0, -10.0), 15, 5);
    world.reserve((3 + args.rows * args.columns) as usize);
    create_test_scene(&mut world, &args)?;

    let file = File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let mut out = BufWriter::new(file);

    for step in 0..args.steps {
        if step % args.dump_interval == 0 {
            for (i, body) in world.bodies().iter().enumerate() {
                let row = PoseRow {
                    step,
                    body: i as u32,
                    x: body.position.x,
                    y: body.position.y,
                    angle: body.rotation.angle(),
                };
                serde_json::to_writer(&mut out, &row)?;
                out.write_all(b"\n")?;
            }
        }

        world.step(TIME_STEP);
        eprint!("\rprogress: {}%", 100 * (step + 1) / args.steps);
    }
    eprintln!();
    out.flush()?;

    let hash = world.step_hash();
    println!("final state hash: {}", hex_prefix(&hash));
    Ok(())
}

fn hex_prefix(hash: &[u8; 32]) -> String {
    hash[..8].iter().map(|b| format!("{b:02x}")).collect()
}
