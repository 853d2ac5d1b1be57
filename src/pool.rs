use std::collections::BTreeMap;

use crate::behavior::Behavior;
use crate::rng::Rng;
use crate::types::{Archetype, NodeId};

// Locked: at most one holder per archetype.
#[derive(Clone, Debug)]
pub struct BehaviorPool {
    archetypes: Vec<Archetype>,
    in_use: BTreeMap<Archetype, usize>,
    jail: NodeId,
    locked: bool,
}

impl BehaviorPool {
    pub fn new(archetypes: &[Archetype], jail: NodeId) -> Self {
        let mut unique = archetypes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        let in_use = unique.iter().map(|&archetype| (archetype, 0)).collect();
        Self {
            archetypes: unique,
            in_use,
            jail,
            locked: true,
        }
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn in_use(&self, archetype: Archetype) -> usize {
        self.in_use.get(&archetype).copied().unwrap_or(0)
    }

    pub fn can_acquire(&self, archetype: Archetype) -> bool {
        self.in_use.contains_key(&archetype) && (!self.locked || self.in_use(archetype) == 0)
    }

    pub fn acquire(&mut self, archetype: Archetype) -> Option<Behavior> {
        if !self.can_acquire(archetype) {
            return None;
        }
        *self.in_use.entry(archetype).or_insert(0) += 1;
        Some(Behavior::new(archetype, self.jail))
    }

    /// Panics if nothing is admissible (locked with every archetype held).
    pub fn acquire_random(&mut self, rng: &mut Rng) -> Behavior {
        assert!(
            self.archetypes.iter().any(|&a| self.can_acquire(a)),
            "acquire_random on a saturated locked pool"
        );
        loop {
            let archetype = self.archetypes[rng.pick_index(self.archetypes.len())];
            if let Some(behavior) = self.acquire(archetype) {
                return behavior;
            }
        }
    }

    pub fn release(&mut self, archetype: Archetype) {
        if let Some(count) = self.in_use.get_mut(&archetype) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn release_all(&mut self) {
        for count in self.in_use.values_mut() {
            *count = 0;
        }
    }
}
