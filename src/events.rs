use serde::Serialize;

use crate::types::{AgentId, GhostMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ModeChanged { mode: GhostMode },
    PelletStateChanged { active: bool },
    PanicTriggered,
    TeamReshuffled,
}

pub trait EventSubscriber {
    fn subscriber_id(&self) -> AgentId;
    fn on_event(&mut self, event: &GameEvent);
}

#[derive(Clone, Debug, Default)]
pub struct EventBus {
    subscribers: Vec<AgentId>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, id: AgentId) {
        if !self.subscribers.contains(&id) {
            self.subscribers.push(id);
        }
    }

    pub fn unsubscribe(&mut self, id: AgentId) {
        self.subscribers.retain(|existing| *existing != id);
    }

    pub fn subscribers(&self) -> &[AgentId] {
        &self.subscribers
    }

    pub fn publish<S: EventSubscriber>(&self, event: &GameEvent, roster: &mut [S]) -> usize {
        let mut delivered = 0;
        for id in &self.subscribers {
            if let Some(subscriber) = roster
                .iter_mut()
                .find(|member| member.subscriber_id() == *id)
            {
                subscriber.on_event(event);
                delivered += 1;
            }
        }
        delivered
    }
}
