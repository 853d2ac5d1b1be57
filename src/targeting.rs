use crate::constants::TARGET_NOISE_PROBABILITY;
use crate::maze::MazeGraph;
use crate::rng::Rng;
use crate::types::{Coord, NodeId};

#[derive(Clone, Copy, Debug)]
pub struct TargetSelector {
    noise: f32,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self {
            noise: TARGET_NOISE_PROBABILITY,
        }
    }
}

impl TargetSelector {
    pub fn new(noise: f32) -> Self {
        Self {
            noise: noise.clamp(0.0, 1.0),
        }
    }

    pub fn without_noise() -> Self {
        Self { noise: 0.0 }
    }

    // Exact ties go to the candidate that does not sit below `start`.
    pub fn select(
        &self,
        goal: Coord,
        start: Coord,
        candidates: &[NodeId],
        maze: &dyn MazeGraph,
        rng: &mut Rng,
    ) -> Option<NodeId> {
        if candidates.is_empty() {
            return None;
        }
        if self.noise > 0.0 && rng.chance(self.noise) {
            return rng.pick(candidates);
        }

        let mut best: Option<(NodeId, f32, Coord)> = None;
        for &candidate in candidates {
            let position = maze.position(candidate);
            let score = position.distance(goal) + start.distance(position);
            best = match best {
                None => Some((candidate, score, position)),
                Some((_, best_score, _)) if score < best_score => {
                    Some((candidate, score, position))
                }
                Some((_, best_score, best_position))
                    if score == best_score
                        && best_position.y < start.y
                        && position.y >= start.y =>
                {
                    Some((candidate, score, position))
                }
                keep => keep,
            };
        }
        best.map(|(node, _, _)| node)
    }
}
