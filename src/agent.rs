use crate::behavior::{Behavior, DecisionContext};
use crate::events::{EventSubscriber, GameEvent};
use crate::rng::Rng;
use crate::types::{AgentId, Archetype, Color, Coord, GhostMode, NodeId};

#[derive(Clone, Debug)]
pub struct Ghost {
    id: AgentId,
    behavior: Behavior,
    position: Coord,
    current_node: NodeId,
    target_node: Option<NodeId>,
    awaiting_decision: bool,
}

impl Ghost {
    pub fn new(id: AgentId, mut behavior: Behavior, home: Coord) -> Self {
        behavior.bind_owner(id);
        let jail = behavior.jail_node();
        Self {
            id,
            behavior,
            position: home,
            current_node: jail,
            target_node: None,
            awaiting_decision: true,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub fn archetype(&self) -> Archetype {
        self.behavior.archetype()
    }

    pub fn name(&self) -> &'static str {
        self.behavior.name()
    }

    pub fn color(&self) -> Color {
        self.behavior.color()
    }

    pub fn mode(&self) -> GhostMode {
        self.behavior.mode()
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn set_position(&mut self, position: Coord) {
        self.position = position;
    }

    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    pub fn target_node(&self) -> Option<NodeId> {
        self.target_node
    }

    pub fn is_awaiting_decision(&self) -> bool {
        self.awaiting_decision
    }

    // The caller settles the pool count for the returned behavior.
    pub fn swap_behavior(&mut self, mut behavior: Behavior) -> Behavior {
        behavior.bind_owner(self.id);
        std::mem::replace(&mut self.behavior, behavior)
    }

    pub fn arrive(&mut self, node: NodeId, position: Coord) {
        self.current_node = node;
        self.position = position;
        self.target_node = None;
        self.awaiting_decision = true;
        if node == self.behavior.jail_node() && self.behavior.mode() == GhostMode::Eaten {
            self.behavior.set_mode(GhostMode::Scatter);
        }
    }

    // `None` means hold position and retry next tick.
    pub fn decide(&mut self, ctx: &DecisionContext<'_>, rng: &mut Rng) -> Option<NodeId> {
        if !self.awaiting_decision {
            return self.target_node;
        }
        let candidates = ctx.maze.neighbors(self.current_node);
        let chosen = self.behavior.next_move(candidates, ctx, rng)?;
        self.target_node = Some(chosen);
        self.awaiting_decision = false;
        Some(chosen)
    }

    pub fn capture(&mut self) -> bool {
        if self.behavior.mode() != GhostMode::Frightened {
            return false;
        }
        self.behavior.set_mode(GhostMode::Eaten);
        true
    }

    pub fn reset(&mut self, home: Coord) {
        self.current_node = self.behavior.jail_node();
        self.position = home;
        self.target_node = None;
        self.awaiting_decision = true;
        self.behavior.set_mode(GhostMode::Scatter);
    }
}

impl EventSubscriber for Ghost {
    fn subscriber_id(&self) -> AgentId {
        self.id
    }

    fn on_event(&mut self, event: &GameEvent) {
        let mode = self.behavior.mode();
        match *event {
            GameEvent::ModeChanged { mode: next } => {
                if mode.is_timeline_mode() {
                    self.behavior.set_mode(next);
                }
            }
            GameEvent::PelletStateChanged { active } => {
                if mode == GhostMode::Eaten {
                    return;
                }
                if active {
                    self.behavior.set_mode(GhostMode::Frightened);
                } else {
                    self.behavior.set_mode(GhostMode::Chase);
                }
            }
            GameEvent::PanicTriggered => {
                self.behavior.set_panic(true);
            }
            GameEvent::TeamReshuffled => {}
        }
    }
}
