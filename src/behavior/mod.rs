use crate::maze::{MazeGraph, PlayerView};
use crate::rng::Rng;
use crate::targeting::TargetSelector;
use crate::team::{TeamCoordinator, TeamMember};
use crate::types::{AgentId, Archetype, Color, Coord, GhostMode, NodeId};

mod chase;

pub struct DecisionContext<'a> {
    pub maze: &'a dyn MazeGraph,
    pub player: PlayerView,
    pub team: &'a [TeamMember],
    pub selector: TargetSelector,
    pub coordinator: TeamCoordinator,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArchetypeState {
    Blinky { panic: bool },
    Pinky,
    Inky { anchor: Option<AgentId> },
    Clyde,
    Sue { heading: Coord },
    Funky { waypoint: usize },
    Spunky,
}

impl ArchetypeState {
    fn fresh(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Blinky => ArchetypeState::Blinky { panic: false },
            Archetype::Pinky => ArchetypeState::Pinky,
            Archetype::Inky => ArchetypeState::Inky { anchor: None },
            Archetype::Clyde => ArchetypeState::Clyde,
            Archetype::Sue => ArchetypeState::Sue {
                heading: Coord::ZERO,
            },
            Archetype::Funky => ArchetypeState::Funky { waypoint: 0 },
            Archetype::Spunky => ArchetypeState::Spunky,
        }
    }

    fn archetype(&self) -> Archetype {
        match self {
            ArchetypeState::Blinky { .. } => Archetype::Blinky,
            ArchetypeState::Pinky => Archetype::Pinky,
            ArchetypeState::Inky { .. } => Archetype::Inky,
            ArchetypeState::Clyde => Archetype::Clyde,
            ArchetypeState::Sue { .. } => Archetype::Sue,
            ArchetypeState::Funky { .. } => Archetype::Funky,
            ArchetypeState::Spunky => Archetype::Spunky,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Behavior {
    state: ArchetypeState,
    mode: GhostMode,
    scatter_corner: Coord,
    jail: NodeId,
    owner: Option<AgentId>,
}

impl Behavior {
    pub fn new(archetype: Archetype, jail: NodeId) -> Self {
        Self {
            state: ArchetypeState::fresh(archetype),
            mode: GhostMode::Scatter,
            scatter_corner: archetype.scatter_corner(),
            jail,
            owner: None,
        }
    }

    pub fn archetype(&self) -> Archetype {
        self.state.archetype()
    }

    pub fn state(&self) -> &ArchetypeState {
        &self.state
    }

    pub fn name(&self) -> &'static str {
        self.archetype().name()
    }

    pub fn color(&self) -> Color {
        self.archetype().color()
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GhostMode) {
        self.mode = mode;
    }

    pub fn jail_node(&self) -> NodeId {
        self.jail
    }

    pub fn bind_owner(&mut self, owner: AgentId) {
        self.owner = Some(owner);
    }

    pub fn owner(&self) -> Option<AgentId> {
        self.owner
    }

    // Only Blinky carries the flag.
    pub fn set_panic(&mut self, value: bool) -> bool {
        match &mut self.state {
            ArchetypeState::Blinky { panic } => {
                *panic = value;
                true
            }
            _ => false,
        }
    }

    pub fn is_panicking(&self) -> bool {
        matches!(self.state, ArchetypeState::Blinky { panic: true })
    }

    pub fn next_move(
        &mut self,
        candidates: &[NodeId],
        ctx: &DecisionContext<'_>,
        rng: &mut Rng,
    ) -> Option<NodeId> {
        let moves = self.filter_jail(candidates);
        if moves.is_empty() {
            return None;
        }
        let start = self.self_position(ctx);

        let chosen = match self.mode {
            GhostMode::Frightened => rng.pick(&moves),
            GhostMode::Eaten => {
                let home = ctx.maze.position(self.jail);
                ctx.selector.select(home, start, &moves, ctx.maze, rng)
            }
            GhostMode::Scatter => {
                let goal = if self.is_panicking() {
                    ctx.player.position
                } else {
                    self.scatter_corner
                };
                ctx.selector.select(goal, start, &moves, ctx.maze, rng)
            }
            GhostMode::Chase => self.chase_move(&moves, start, ctx, rng),
        };

        if let (Some(node), ArchetypeState::Sue { heading }) = (chosen, &mut self.state) {
            if let Some(dir) = (ctx.maze.position(node) - start).normalized() {
                *heading = dir;
            }
        }
        chosen
    }

    fn filter_jail(&self, candidates: &[NodeId]) -> Vec<NodeId> {
        candidates
            .iter()
            .copied()
            .filter(|&node| node != self.jail || self.mode == GhostMode::Eaten)
            .collect()
    }

    fn self_position(&self, ctx: &DecisionContext<'_>) -> Coord {
        self.owner
            .and_then(|owner| ctx.coordinator.position_of(ctx.team, owner))
            .unwrap_or_else(|| ctx.maze.position(self.jail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::NavGraph;

    struct Cross {
        graph: NavGraph,
        up: NodeId,
        right: NodeId,
        left: NodeId,
        jail: NodeId,
    }

    // Plus-shaped graph; the node below the centre is the jail.
    fn cross() -> Cross {
        let mut graph = NavGraph::new();
        let center = graph.add_node(Coord::new(0.0, 0.0));
        let up = graph.add_node(Coord::new(0.0, 1.0));
        let right = graph.add_node(Coord::new(1.0, 0.0));
        let left = graph.add_node(Coord::new(-1.0, 0.0));
        let jail = graph.add_node(Coord::new(0.0, -1.0));
        for node in [up, right, left, jail] {
            graph.connect(center, node);
        }
        Cross {
            graph,
            up,
            right,
            left,
            jail,
        }
    }

    fn owner_at(archetype: Archetype, position: Coord) -> TeamMember {
        TeamMember {
            id: AgentId(0),
            archetype,
            position,
        }
    }

    fn ctx<'a>(
        graph: &'a NavGraph,
        team: &'a [TeamMember],
        player: Coord,
        heading: Coord,
    ) -> DecisionContext<'a> {
        DecisionContext {
            maze: graph,
            player: PlayerView {
                position: player,
                heading,
            },
            team,
            selector: TargetSelector::without_noise(),
            coordinator: TeamCoordinator,
        }
    }

    fn behavior(archetype: Archetype, jail: NodeId, mode: GhostMode) -> Behavior {
        let mut behavior = Behavior::new(archetype, jail);
        behavior.bind_owner(AgentId(0));
        behavior.set_mode(mode);
        behavior
    }

    #[test]
    fn fresh_behavior_starts_in_scatter_with_static_identity() {
        let behavior = Behavior::new(Archetype::Inky, NodeId(4));
        assert_eq!(behavior.mode(), GhostMode::Scatter);
        assert_eq!(behavior.name(), "Inky");
        assert_eq!(behavior.color(), Archetype::Inky.color());
        assert_eq!(behavior.jail_node(), NodeId(4));
        assert_eq!(behavior.owner(), None);
    }

    #[test]
    fn jail_is_never_chosen_outside_eaten_mode() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left, maze.jail];
        for archetype in Archetype::ALL {
            let team = [owner_at(archetype, Coord::ZERO)];
            for mode in [GhostMode::Chase, GhostMode::Scatter, GhostMode::Frightened] {
                for seed in 0..200u32 {
                    let mut rng = Rng::new(seed);
                    let mut b = behavior(archetype, maze.jail, mode);
                    let context = ctx(&maze.graph, &team, Coord::new(0.0, -6.0), Coord::ZERO);
                    let chosen = b.next_move(&candidates, &context, &mut rng);
                    assert!(chosen.is_some());
                    assert_ne!(chosen, Some(maze.jail), "{archetype:?} in {mode:?}");
                }
            }
        }
    }

    #[test]
    fn jail_is_the_only_target_when_eaten_next_to_it() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left, maze.jail];
        for archetype in Archetype::ALL {
            let team = [owner_at(archetype, Coord::ZERO)];
            let context = ctx(&maze.graph, &team, Coord::new(5.0, 5.0), Coord::ZERO);
            let mut rng = Rng::new(8);
            let mut eaten = behavior(archetype, maze.jail, GhostMode::Eaten);
            assert_eq!(eaten.next_move(&candidates, &context, &mut rng), Some(maze.jail));

            let mut chasing = behavior(archetype, maze.jail, GhostMode::Chase);
            assert_eq!(chasing.next_move(&[maze.jail], &context, &mut rng), None);
        }
    }

    #[test]
    fn empty_candidates_hold_position_in_every_mode() {
        let maze = cross();
        let team = [owner_at(Archetype::Blinky, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(2.0, 0.0), Coord::ZERO);
        let mut rng = Rng::new(1);
        for mode in [
            GhostMode::Chase,
            GhostMode::Scatter,
            GhostMode::Frightened,
            GhostMode::Eaten,
        ] {
            let mut b = behavior(Archetype::Blinky, maze.jail, mode);
            assert_eq!(b.next_move(&[], &context, &mut rng), None);
        }
    }

    #[test]
    fn blinky_and_pinky_differ_by_lookahead() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left];
        let mut rng = Rng::new(4);

        let team = [owner_at(Archetype::Blinky, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(3.0, 1.0), Coord::new(-1.0, 0.0));
        let mut blinky = behavior(Archetype::Blinky, maze.jail, GhostMode::Chase);
        assert_eq!(blinky.next_move(&candidates, &context, &mut rng), Some(maze.right));

        let team = [owner_at(Archetype::Pinky, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(3.0, 1.0), Coord::new(-1.0, 0.0));
        let mut pinky = behavior(Archetype::Pinky, maze.jail, GhostMode::Chase);
        assert_eq!(pinky.next_move(&candidates, &context, &mut rng), Some(maze.up));
    }

    #[test]
    fn panicking_blinky_chases_during_scatter() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left];
        let team = [owner_at(Archetype::Blinky, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(-4.0, 0.0), Coord::ZERO);
        let mut rng = Rng::new(6);

        let mut calm = behavior(Archetype::Blinky, maze.jail, GhostMode::Scatter);
        assert_eq!(calm.next_move(&candidates, &context, &mut rng), Some(maze.up));

        let mut panicked = behavior(Archetype::Blinky, maze.jail, GhostMode::Scatter);
        assert!(panicked.set_panic(true));
        assert!(panicked.is_panicking());
        assert_eq!(panicked.next_move(&candidates, &context, &mut rng), Some(maze.left));
    }

    #[test]
    fn only_blinky_carries_a_panic_flag() {
        for archetype in Archetype::ALL {
            let mut b = Behavior::new(archetype, NodeId(0));
            assert_eq!(b.set_panic(true), archetype == Archetype::Blinky);
        }
    }

    #[test]
    fn inky_flanks_relative_to_the_anchor() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left];
        let mut rng = Rng::new(12);
        let player = Coord::new(1.0, 0.0);
        let heading = Coord::new(0.0, 1.0);

        let inky = owner_at(Archetype::Inky, Coord::ZERO);
        let west_anchor = TeamMember {
            id: AgentId(1),
            archetype: Archetype::Blinky,
            position: Coord::new(-3.0, 1.5),
        };
        let team = [inky, west_anchor];
        let context = ctx(&maze.graph, &team, player, heading);
        let mut b = behavior(Archetype::Inky, maze.jail, GhostMode::Chase);
        assert_eq!(b.next_move(&candidates, &context, &mut rng), Some(maze.right));
        assert_eq!(
            b.state(),
            &ArchetypeState::Inky {
                anchor: Some(AgentId(1))
            }
        );

        let east_anchor = TeamMember {
            position: Coord::new(5.0, 1.5),
            ..west_anchor
        };
        let team = [inky, east_anchor];
        let context = ctx(&maze.graph, &team, player, heading);
        assert_eq!(b.next_move(&candidates, &context, &mut rng), Some(maze.left));
    }

    #[test]
    fn clyde_backs_off_when_close() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left];
        let team = [owner_at(Archetype::Clyde, Coord::ZERO)];
        let mut rng = Rng::new(3);
        let mut b = behavior(Archetype::Clyde, maze.jail, GhostMode::Chase);

        let far = ctx(&maze.graph, &team, Coord::new(20.0, 0.0), Coord::ZERO);
        assert_eq!(b.next_move(&candidates, &far, &mut rng), Some(maze.right));

        let near = ctx(&maze.graph, &team, Coord::new(3.0, 0.0), Coord::ZERO);
        assert_eq!(b.next_move(&candidates, &near, &mut rng), Some(maze.left));
    }

    #[test]
    fn sue_keeps_heading_and_turns_randomly_at_walls() {
        let maze = cross();
        let team = [owner_at(Archetype::Sue, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(0.0, 8.0), Coord::ZERO);
        let mut rng = Rng::new(21);
        let mut b = behavior(Archetype::Sue, maze.jail, GhostMode::Chase);

        assert_eq!(b.next_move(&[maze.right], &context, &mut rng), Some(maze.right));
        assert_eq!(
            b.state(),
            &ArchetypeState::Sue {
                heading: Coord::new(1.0, 0.0)
            }
        );
        // Straight ahead wins over the player-facing turn.
        assert_eq!(
            b.next_move(&[maze.up, maze.right, maze.left], &context, &mut rng),
            Some(maze.right)
        );

        let mut saw_up = false;
        let mut saw_left = false;
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let mut turning = b.clone();
            match turning.next_move(&[maze.up, maze.left], &context, &mut rng) {
                Some(node) if node == maze.up => saw_up = true,
                Some(node) if node == maze.left => saw_left = true,
                other => panic!("unexpected move {other:?}"),
            }
        }
        assert!(saw_up && saw_left);
    }

    #[test]
    fn funky_advances_waypoint_when_reached() {
        let mut graph = NavGraph::new();
        let corner = crate::constants::MAZE_CORNERS[0];
        let west = graph.add_node(corner + Coord::new(-1.0, 0.0));
        let east = graph.add_node(corner + Coord::new(1.0, 0.0));
        let jail = graph.add_node(Coord::ZERO);
        let team = [owner_at(Archetype::Funky, corner)];
        let context = ctx(&graph, &team, Coord::ZERO, Coord::ZERO);
        let mut rng = Rng::new(2);
        let mut b = behavior(Archetype::Funky, jail, GhostMode::Chase);

        assert_eq!(b.next_move(&[west, east], &context, &mut rng), Some(west));
        assert_eq!(b.state(), &ArchetypeState::Funky { waypoint: 1 });
    }

    #[test]
    fn spunky_chases_only_within_range() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left];
        let team = [owner_at(Archetype::Spunky, Coord::ZERO)];
        let near = ctx(&maze.graph, &team, Coord::new(0.0, 10.0), Coord::ZERO);
        let far = ctx(&maze.graph, &team, Coord::new(0.0, 30.0), Coord::ZERO);

        let mut picks = std::collections::HashSet::new();
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let mut b = behavior(Archetype::Spunky, maze.jail, GhostMode::Chase);
            assert_eq!(b.next_move(&candidates, &near, &mut rng), Some(maze.up));
            if let Some(node) = b.next_move(&candidates, &far, &mut rng) {
                picks.insert(node);
            }
        }
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn frightened_moves_cover_every_open_neighbor() {
        let maze = cross();
        let candidates = [maze.up, maze.right, maze.left, maze.jail];
        let team = [owner_at(Archetype::Pinky, Coord::ZERO)];
        let context = ctx(&maze.graph, &team, Coord::new(1.0, 1.0), Coord::ZERO);
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let mut b = behavior(Archetype::Pinky, maze.jail, GhostMode::Frightened);
            if let Some(node) = b.next_move(&candidates, &context, &mut rng) {
                seen.insert(node);
            }
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&maze.jail));
    }
}
