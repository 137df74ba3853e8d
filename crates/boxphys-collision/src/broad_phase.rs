use boxphys_core::{Dim, Scalar};
use boxphys_geom::{aabb_of, Aabb, Body};

/// One AABB face along the sweep axis.
#[derive(Copy, Clone, Debug)]
struct Endpoint {
    position: Scalar,
    index: u32,
    is_start: bool,
}

impl Endpoint {
    /// Sort order: coordinate ascending, then "end" before "start" so that a
    /// body ending exactly where another starts is not counted as an overlap.
    #[inline]
    fn precedes(&self, other: &Endpoint) -> bool {
        if self.position != other.position {
            self.position < other.position
        } else {
            !self.is_start && other.is_start
        }
    }
}

/// Sweep-and-prune broad phase along the x axis.
///
/// The endpoint list persists across steps: temporal coherence keeps it
/// nearly sorted, so the per-step insertion sort is close to linear.
/// Endpoints for newly added bodies are appended; the list is rebuilt from
/// scratch only when it is longer than `2 * bodies.len()`, which happens
/// after `clear`.
pub struct BroadPhase<D: Dim> {
    aabbs: Vec<Aabb<D>>,
    endpoints: Vec<Endpoint>,
    active: Vec<u32>,
    active_slots: Vec<u32>,
}

impl<D: Dim> BroadPhase<D> {
    pub fn new() -> Self {
        Self {
            aabbs: Vec::new(),
            endpoints: Vec::new(),
            active: Vec::new(),
            active_slots: Vec::new(),
        }
    }

    /// World AABBs rebuilt by the last `update`, one per body.
    #[inline]
    pub fn aabbs(&self) -> &[Aabb<D>] {
        &self.aabbs
    }

    #[inline]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn clear(&mut self) {
        self.aabbs.clear();
        self.endpoints.clear();
        self.active.clear();
        self.active_slots.clear();
    }

    /// Rebuilds the AABBs and reports every overlapping pair `(i, j)` with
    /// `i < j`, skipping static-static pairs. No duplicates are emitted.
    pub fn update<F>(&mut self, bodies: &[Body<D>], on_pair: F)
    where
        F: FnMut(u32, u32),
    {
        self.aabbs.clear();
        self.aabbs.reserve(bodies.len());
        for body in bodies {
            self.aabbs.push(aabb_of(body));
        }

        self.active_slots.resize(bodies.len(), 0);

        // Stale endpoints can only outnumber bodies after a clear.
        if self.endpoints.len() > bodies.len() * 2 {
            self.endpoints.clear();
        }

        // Append endpoints for bodies added since the last update.
        debug_assert!(self.endpoints.len() % 2 == 0);
        for index in (self.endpoints.len() / 2)..bodies.len() {
            self.endpoints.push(Endpoint {
                position: 0.0,
                index: index as u32,
                is_start: true,
            });
            self.endpoints.push(Endpoint {
                position: 0.0,
                index: index as u32,
                is_start: false,
            });
        }

        for endpoint in &mut self.endpoints {
            let aabb = &self.aabbs[endpoint.index as usize];
            endpoint.position = if endpoint.is_start {
                D::axis(aabb.min, 0)
            } else {
                D::axis(aabb.max, 0)
            };
        }

        insertion_sort(&mut self.endpoints);
        self.sweep(bodies, on_pair);
    }

    fn sweep<F>(&mut self, bodies: &[Body<D>], mut on_pair: F)
    where
        F: FnMut(u32, u32),
    {
        self.active.clear();
        for endpoint in &self.endpoints {
            if endpoint.is_start {
                let i1 = endpoint.index;
                let body_a_static = bodies[i1 as usize].is_static();
                let aabb_a = &self.aabbs[i1 as usize];

                for &i2 in &self.active {
                    if body_a_static && bodies[i2 as usize].is_static() {
                        continue;
                    }

                    // The sweep already proved x overlap; test the rest.
                    if !aabb_a.overlaps_from_axis(&self.aabbs[i2 as usize], 1) {
                        continue;
                    }

                    if i1 < i2 {
                        on_pair(i1, i2);
                    } else {
                        on_pair(i2, i1);
                    }
                }

                self.active_slots[i1 as usize] = self.active.len() as u32;
                self.active.push(i1);
            } else {
                // Swap and pop through the recorded slot.
                let slot = self.active_slots[endpoint.index as usize] as usize;
                let last = self.active[self.active.len() - 1];
                self.active[slot] = last;
                self.active_slots[last as usize] = slot as u32;
                self.active.pop();
            }
        }
    }
}

impl<D: Dim> Default for BroadPhase<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain insertion sort; the endpoint list is nearly sorted between steps.
fn insertion_sort(endpoints: &mut [Endpoint]) {
    for i in 1..endpoints.len() {
        let key = endpoints[i];
        let mut j = i;
        while j > 0 && key.precedes(&endpoints[j - 1]) {
            endpoints[j] = endpoints[j - 1];
            j -= 1;
        }
        endpoints[j] = key;
    }
}
