use super::Assignment;
use crate::agent::Ghost;
use crate::behavior::Behavior;
use crate::pool::BehaviorPool;
use crate::rng::Rng;
use crate::types::{AgentId, Archetype, GhostMode};

// Returns the ids whose archetype changed. Frightened and Eaten ghosts keep
// their mode regardless of `forced_mode`.
pub fn assign(
    assignment: Assignment,
    team: &mut [Ghost],
    pool: &mut BehaviorPool,
    rng: &mut Rng,
    forced_mode: Option<GhostMode>,
) -> Vec<AgentId> {
    pool.release_all();
    let mut changed = Vec::new();
    match assignment {
        Assignment::Fixed => {
            if team.len() > Archetype::CLASSIC.len() {
                pool.unlock();
            } else {
                pool.lock();
            }
            for (idx, ghost) in team.iter_mut().enumerate() {
                let archetype = Archetype::CLASSIC[idx % Archetype::CLASSIC.len()];
                let behavior = pool
                    .acquire(archetype)
                    .unwrap_or_else(|| Behavior::new(archetype, ghost.behavior().jail_node()));
                install(ghost, behavior, forced_mode, &mut changed);
            }
        }
        Assignment::Random => {
            pool.lock();
            for ghost in team.iter_mut() {
                if !pool.archetypes().iter().any(|&a| pool.can_acquire(a)) {
                    // More ghosts than archetypes: the overflow may share.
                    pool.unlock();
                }
                let behavior = pool.acquire_random(rng);
                install(ghost, behavior, forced_mode, &mut changed);
            }
        }
        Assignment::Rush => {
            pool.unlock();
            let Some(archetype) = rng.pick(pool.archetypes()) else {
                return changed;
            };
            for ghost in team.iter_mut() {
                let behavior = pool
                    .acquire(archetype)
                    .unwrap_or_else(|| Behavior::new(archetype, ghost.behavior().jail_node()));
                install(ghost, behavior, forced_mode, &mut changed);
            }
        }
    }
    changed
}

fn install(
    ghost: &mut Ghost,
    mut behavior: Behavior,
    forced_mode: Option<GhostMode>,
    changed: &mut Vec<AgentId>,
) {
    let current = ghost.mode();
    let mode = if current.is_timeline_mode() {
        forced_mode.unwrap_or(current)
    } else {
        current
    };
    behavior.set_mode(mode);
    let previous = ghost.swap_behavior(behavior);
    if previous.archetype() != ghost.archetype() {
        changed.push(ghost.id());
    }
}
