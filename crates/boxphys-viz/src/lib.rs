use boxphys_core::{schedule_digest, StepStage};

/* ---------------------- Schedule recorder ---------------------- */

/// Records the stages executed by one step, in order.
#[derive(Default)]
pub struct ScheduleRecorder {
    stages: Vec<StepStage>,
}

impl ScheduleRecorder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }
    pub fn push(&mut self, stage: StepStage) {
        self.stages.push(stage);
    }
    pub fn clear(&mut self) {
        self.stages.clear();
    }
    pub fn digest(&self) -> [u8; 32] {
        schedule_digest(&self.stages)
    }
}

/* ---------------------- Debug settings ---------------------- */

#[derive(Copy, Clone, Debug)]
pub struct DebugSettings {
    /// Print a summary every N ticks (0 = disabled).
    pub print_every: u32,
    pub show_bodies: bool,
    pub show_contacts: bool,
    pub show_energy: bool,
    /// Clamp on printed lines per block.
    pub max_lines: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            print_every: 0,
            show_bodies: false,
            show_contacts: false,
            show_energy: false,
            max_lines: 200,
        }
    }
}

/* ---------------------- Telemetry events ---------------------- */

/// One telemetry record. Coordinates are padded to three components so 2D
/// and 3D worlds share the ledger format (z = 0 in 2D).
#[derive(Copy, Clone, Debug)]
pub enum LedgerEvent {
    /// A body was integrated to a new position.
    Integrate { id: u32, position: [f32; 3] },

    /// The narrow phase produced contact points for a pair.
    ContactBegin {
        a: u32,
        b: u32,
        points: u32,
        max_penetration: f32,
    },

    /// Accumulated impulses of one manifold after the velocity solve.
    ManifoldImpulse {
        a: u32,
        b: u32,
        normal: f32,
        tangent: f32,
    },
}

impl LedgerEvent {
    pub fn to_json(&self) -> String {
        match *self {
            LedgerEvent::Integrate { id, position } => format!(
                r#"{{"t":"I","id":{},"px":{:.6},"py":{:.6},"pz":{:.6}}}"#,
                id, position[0], position[1], position[2]
            ),
            LedgerEvent::ContactBegin {
                a,
                b,
                points,
                max_penetration,
            } => format!(
                r#"{{"t":"C","a":{},"b":{},"n":{},"pen":{:.6}}}"#,
                a, b, points, max_penetration
            ),
            LedgerEvent::ManifoldImpulse {
                a,
                b,
                normal,
                tangent,
            } => format!(
                r#"{{"t":"M","a":{},"b":{},"jn":{:.6},"jt":{:.6}}}"#,
                a, b, normal, tangent
            ),
        }
    }
}

/* ---------------------- Ledger buffer ---------------------- */

/// Bounded per-tick event buffer; extra events are dropped, never reallocated.
pub struct Ledger {
    events: Vec<LedgerEvent>,
    cap: usize,
}

impl Ledger {
    pub fn new(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push(&mut self, event: LedgerEvent) {
        if self.events.len() < self.cap {
            self.events.push(event);
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter()
    }

    /// Write events as JSONL to `dir/telemetry_######.jsonl`.
    pub fn write_jsonl(&self, dir: &str, tick: u64) -> std::io::Result<()> {
        use std::fs::{create_dir_all, OpenOptions};
        use std::io::Write;

        create_dir_all(dir)?;
        let path = format!("{}/telemetry_{:06}.jsonl", dir, tick);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        for event in &self.events {
            file.write_all(event.to_json().as_bytes())?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }
}
