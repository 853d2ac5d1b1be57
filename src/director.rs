use serde::Serialize;

use crate::agent::Ghost;
use crate::behavior::{Behavior, DecisionContext};
use crate::constants::{CHAOS_RESHUFFLE_INTERVAL_MS, TARGET_NOISE_PROBABILITY};
use crate::events::{EventBus, GameEvent};
use crate::maze::{MazeGraph, PlayerView};
use crate::pool::BehaviorPool;
use crate::rng::Rng;
use crate::scheduler::{variant, Assignment, ModeScheduler};
use crate::targeting::TargetSelector;
use crate::team::{TeamCoordinator, TeamMember};
use crate::types::{AgentId, Archetype, Color, Coord, GameVariant, GhostMode, NodeId, RoundStart};

#[derive(Clone, Copy, Debug)]
pub struct DirectorOptions {
    pub variant: GameVariant,
    pub seed: u32,
    pub noise: f32,
    pub chaos_interval_ms: u64,
}

impl Default for DirectorOptions {
    fn default() -> Self {
        Self {
            variant: GameVariant::Classic,
            seed: 1,
            noise: TARGET_NOISE_PROBABILITY,
            chaos_interval_ms: CHAOS_RESHUFFLE_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub agent: AgentId,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub decisions: Vec<Decision>,
    pub reshuffled: Vec<AgentId>,
}

pub struct GhostDirector {
    scheduler: ModeScheduler,
    pool: BehaviorPool,
    bus: EventBus,
    ghosts: Vec<Ghost>,
    rng: Rng,
    selector: TargetSelector,
    coordinator: TeamCoordinator,
    home: Coord,
    remaining: usize,
}

impl GhostDirector {
    // Placeholder classic behaviors until the first start_round.
    pub fn new(options: DirectorOptions, ghost_count: usize, jail: NodeId, home: Coord) -> Self {
        let mut bus = EventBus::new();
        let ghosts: Vec<Ghost> = (0..ghost_count)
            .map(|idx| {
                let archetype = Archetype::CLASSIC[idx % Archetype::CLASSIC.len()];
                let ghost = Ghost::new(AgentId(idx), Behavior::new(archetype, jail), home);
                bus.subscribe(ghost.id());
                ghost
            })
            .collect();
        Self {
            scheduler: ModeScheduler::with_reshuffle_interval(
                options.variant,
                options.chaos_interval_ms,
            ),
            pool: BehaviorPool::new(options.variant.archetypes(), jail),
            bus,
            ghosts,
            rng: Rng::new(options.seed),
            selector: TargetSelector::new(options.noise),
            coordinator: TeamCoordinator,
            home,
            remaining: usize::MAX,
        }
    }

    pub fn scheduler(&self) -> &ModeScheduler {
        &self.scheduler
    }

    pub fn pool(&self) -> &BehaviorPool {
        &self.pool
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, agent: AgentId) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.id() == agent)
    }

    pub fn mode(&self, agent: AgentId) -> Option<GhostMode> {
        self.ghost(agent).map(Ghost::mode)
    }

    pub fn color(&self, agent: AgentId) -> Option<Color> {
        self.ghost(agent).map(Ghost::color)
    }

    pub fn name(&self, agent: AgentId) -> Option<&'static str> {
        self.ghost(agent).map(Ghost::name)
    }

    // `reshuffled` lists every ghost on a new game, otherwise only those whose
    // archetype changed.
    pub fn start_round(&mut self, reason: RoundStart) -> TickReport {
        self.scheduler.reset();
        self.remaining = usize::MAX;
        for ghost in &mut self.ghosts {
            ghost.reset(self.home);
        }
        let assignment = self.scheduler.round_assignment(reason);
        let changed = match assignment {
            Some(assignment) => variant::assign(
                assignment,
                &mut self.ghosts,
                &mut self.pool,
                &mut self.rng,
                None,
            ),
            None => Vec::new(),
        };
        for ghost in &mut self.ghosts {
            ghost.behavior_mut().set_panic(false);
        }

        let mut report = TickReport::default();
        if reason == RoundStart::NewGame {
            report.reshuffled = self.ghosts.iter().map(Ghost::id).collect();
            return report;
        }
        report.reshuffled = changed;
        if assignment == Some(Assignment::Random) {
            let event = GameEvent::TeamReshuffled;
            self.publish(&event);
            report.events.push(event);
        }
        report
    }

    pub fn set_remaining(&mut self, remaining: usize) {
        self.remaining = remaining;
    }

    pub fn step(&mut self, dt_ms: u64, maze: &dyn MazeGraph, player: PlayerView) -> TickReport {
        let mut report = TickReport::default();
        for event in self.scheduler.step(dt_ms) {
            if event == GameEvent::TeamReshuffled {
                report.reshuffled = self.reshuffle();
            }
            self.publish(&event);
            report.events.push(event);
        }

        let team: Vec<TeamMember> = self
            .ghosts
            .iter()
            .map(|ghost| TeamMember {
                id: ghost.id(),
                archetype: ghost.archetype(),
                position: ghost.position(),
            })
            .collect();
        let ctx = DecisionContext {
            maze,
            player,
            team: &team,
            selector: self.selector,
            coordinator: self.coordinator,
        };
        for ghost in &mut self.ghosts {
            if !ghost.is_awaiting_decision() {
                continue;
            }
            let from = ghost.current_node();
            if let Some(to) = ghost.decide(&ctx, &mut self.rng) {
                report.decisions.push(Decision {
                    agent: ghost.id(),
                    from,
                    to,
                });
            }
        }
        report
    }

    pub fn pellet_eaten(&mut self, remaining: usize) -> Vec<GameEvent> {
        self.remaining = remaining;
        let events = self.scheduler.pellet_eaten(remaining);
        for event in &events {
            self.publish(event);
        }
        events
    }

    pub fn power_pellet_eaten(&mut self, duration_ms: u64, remaining: usize) -> Vec<GameEvent> {
        self.remaining = remaining;
        let events = self.scheduler.power_pellet_eaten(duration_ms, remaining);
        for event in &events {
            self.publish(event);
        }
        events
    }

    pub fn ghost_captured(&mut self, agent: AgentId, points: i32) -> Option<i32> {
        let ghost = self.ghosts.iter_mut().find(|ghost| ghost.id() == agent)?;
        if !ghost.capture() {
            return None;
        }
        Some(self.scheduler.ghost_captured(points))
    }

    pub fn agent_arrived(&mut self, agent: AgentId, node: NodeId, position: Coord) {
        if let Some(ghost) = self.ghosts.iter_mut().find(|ghost| ghost.id() == agent) {
            ghost.arrive(node, position);
        }
    }

    pub fn set_agent_position(&mut self, agent: AgentId, position: Coord) {
        if let Some(ghost) = self.ghosts.iter_mut().find(|ghost| ghost.id() == agent) {
            ghost.set_position(position);
        }
    }

    fn reshuffle(&mut self) -> Vec<AgentId> {
        let assignment = self
            .scheduler
            .reshuffle_assignment(self.remaining, &mut self.rng);
        let changed = variant::assign(
            assignment,
            &mut self.ghosts,
            &mut self.pool,
            &mut self.rng,
            Some(GhostMode::Chase),
        );
        if self.scheduler.is_panicking() {
            for ghost in &mut self.ghosts {
                ghost.behavior_mut().set_panic(true);
            }
        }
        changed
    }

    fn publish(&mut self, event: &GameEvent) {
        self.bus.publish(event, &mut self.ghosts);
    }
}
