use super::*;
use crate::constants::{
    CLYDE_SHY_DISTANCE, FUNKY_WAYPOINT_EPSILON, INKY_LOOKAHEAD, MAZE_CORNERS, PINKY_LOOKAHEAD,
    SPUNKY_SIGHT_RANGE,
};

impl Behavior {
    pub(super) fn chase_move(
        &mut self,
        moves: &[NodeId],
        start: Coord,
        ctx: &DecisionContext<'_>,
        rng: &mut Rng,
    ) -> Option<NodeId> {
        let player = ctx.player.position;
        let heading = ctx.player.heading;
        let scatter_corner = self.scatter_corner;

        let goal = match &mut self.state {
            ArchetypeState::Blinky { .. } => player,
            ArchetypeState::Pinky => player + heading * PINKY_LOOKAHEAD,
            ArchetypeState::Inky { anchor } => {
                if !ctx.team.is_empty() {
                    *anchor = Some(ctx.coordinator.pick_anchor(ctx.team));
                }
                let anchor_pos = anchor
                    .and_then(|id| ctx.coordinator.position_of(ctx.team, id))
                    .unwrap_or(start);
                let offset_a = heading * INKY_LOOKAHEAD;
                let offset_b = player + offset_a - anchor_pos;
                player + offset_a + offset_b
            }
            ArchetypeState::Clyde => {
                if start.distance(player) > CLYDE_SHY_DISTANCE {
                    player
                } else {
                    scatter_corner
                }
            }
            ArchetypeState::Sue { heading: committed } => {
                return Self::heading_move(*committed, moves, start, ctx.maze, rng);
            }
            ArchetypeState::Funky { waypoint } => {
                if start.distance(MAZE_CORNERS[*waypoint]) < FUNKY_WAYPOINT_EPSILON {
                    *waypoint = (*waypoint + 1) % MAZE_CORNERS.len();
                }
                MAZE_CORNERS[*waypoint]
            }
            ArchetypeState::Spunky => {
                if start.distance(player) >= SPUNKY_SIGHT_RANGE {
                    return rng.pick(moves);
                }
                player
            }
        };

        ctx.selector.select(goal, start, moves, ctx.maze, rng)
    }

    // Random pick when every option turns 90 degrees or more.
    fn heading_move(
        committed: Coord,
        moves: &[NodeId],
        start: Coord,
        maze: &dyn MazeGraph,
        rng: &mut Rng,
    ) -> Option<NodeId> {
        // Largest cosine is the smallest angle; cos <= 0 means >= 90 degrees.
        let mut best: Option<(NodeId, f32)> = None;
        for &node in moves {
            let Some(cos) = committed.cos_angle_to(maze.position(node) - start) else {
                continue;
            };
            match best {
                Some((_, best_cos)) if cos <= best_cos => {}
                _ => best = Some((node, cos)),
            }
        }
        match best {
            Some((node, cos)) if cos > 0.0 => Some(node),
            _ => rng.pick(moves),
        }
    }
}
