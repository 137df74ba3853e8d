use std::collections::hash_map::Entry;
use std::collections::HashMap;

use boxphys_collision::CollisionManifold;
use boxphys_core::Dim;
use boxphys_geom::Body;

use crate::manifold::ContactManifold;

/// Cache key for an ordered body index pair.
#[inline]
pub fn pair_key(body_a: u32, body_b: u32) -> u64 {
    debug_assert!(body_a < body_b);
    ((body_a as u64) << 32) | body_b as u64
}

/// Contact constraint solver and owner of the persistent manifold cache.
///
/// Manifolds live in a dense array so the solver iterations stay
/// cache-friendly; the hash map only translates pair keys to slots. Removal
/// swap-and-pops the array and rewires the moved manifold's map entry.
pub struct ContactSolver<D: Dim> {
    manifolds: Vec<ContactManifold<D>>,
    pair_slots: HashMap<u64, u32>,
}

impl<D: Dim> ContactSolver<D> {
    pub fn new() -> Self {
        Self {
            manifolds: Vec::new(),
            pair_slots: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.manifolds.clear();
        self.pair_slots.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    /// All live manifolds with their pair keys, in solver iteration order.
    pub fn manifolds(&self) -> impl Iterator<Item = (u64, &ContactManifold<D>)> {
        self.manifolds
            .iter()
            .map(|m| (pair_key(m.body_a(), m.body_b()), m))
    }

    /// Looks up the manifold of a specific pair.
    pub fn manifold(&self, body_a: u32, body_b: u32) -> Option<&ContactManifold<D>> {
        self.pair_slots
            .get(&pair_key(body_a, body_b))
            .map(|&slot| &self.manifolds[slot as usize])
    }

    /// Step start: every manifold is presumed dead until the narrow phase
    /// reports its pair again.
    pub fn prepare_manifolds_update(&mut self) {
        for manifold in &mut self.manifolds {
            manifold.mark_obsolete();
        }
    }

    /// Narrow-phase callback: update the pair's manifold or create one.
    pub fn on_collision(&mut self, collision: &CollisionManifold<D>, bodies: &[Body<D>]) {
        let key = pair_key(collision.body_a, collision.body_b);
        match self.pair_slots.entry(key) {
            Entry::Occupied(slot) => {
                self.manifolds[*slot.get() as usize].update(collision);
            }
            Entry::Vacant(slot) => {
                slot.insert(self.manifolds.len() as u32);
                self.manifolds.push(ContactManifold::new(collision, bodies));
            }
        }
    }

    /// Step end of the collision phase: drop manifolds whose pair separated.
    pub fn finish_manifolds_update(&mut self) {
        let mut index = 0;
        while index < self.manifolds.len() {
            if self.manifolds[index].is_obsolete() {
                let dead = &self.manifolds[index];
                self.pair_slots
                    .remove(&pair_key(dead.body_a(), dead.body_b()));
                self.manifolds.swap_remove(index);

                // The previously-last manifold moved into this slot.
                if index < self.manifolds.len() {
                    let moved = &self.manifolds[index];
                    if let Some(slot) = self
                        .pair_slots
                        .get_mut(&pair_key(moved.body_a(), moved.body_b()))
                    {
                        *slot = index as u32;
                    }
                }
            } else {
                index += 1;
            }
        }
    }

    /// Precomputes solver quantities and applies the warm-start impulses.
    pub fn prepare_to_solve(&mut self, bodies: &mut [Body<D>]) {
        for manifold in &mut self.manifolds {
            manifold.prepare_to_solve(bodies);
        }
    }

    pub fn solve_velocities(&mut self, bodies: &mut [Body<D>], iterations: u32) {
        for _ in 0..iterations {
            for manifold in &mut self.manifolds {
                manifold.solve_velocities(bodies);
            }
        }
    }

    pub fn solve_positions(&mut self, bodies: &mut [Body<D>], iterations: u32) {
        for _ in 0..iterations {
            for manifold in &mut self.manifolds {
                manifold.solve_positions(bodies);
            }
        }
    }
}

impl<D: Dim> Default for ContactSolver<D> {
    fn default() -> Self {
        Self::new()
    }
}
