use serde::Serialize;

use crate::types::{AgentId, Archetype, Coord};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TeamMember {
    pub id: AgentId,
    pub archetype: Archetype,
    pub position: Coord,
}

pub fn anchor_rank(archetype: Archetype) -> u8 {
    match archetype {
        Archetype::Blinky => 1,
        Archetype::Pinky => 2,
        Archetype::Clyde => 3,
        Archetype::Inky => 4,
        Archetype::Sue => 5,
        Archetype::Funky => 6,
        Archetype::Spunky => 7,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TeamCoordinator;

impl TeamCoordinator {
    /// Panics on an empty roster.
    pub fn pick_anchor(&self, roster: &[TeamMember]) -> AgentId {
        assert!(!roster.is_empty(), "pick_anchor needs at least one teammate");
        let mut best = roster[0];
        for member in &roster[1..] {
            if anchor_rank(member.archetype) < anchor_rank(best.archetype) {
                best = *member;
            }
        }
        best.id
    }

    pub fn position_of(&self, roster: &[TeamMember], id: AgentId) -> Option<Coord> {
        roster
            .iter()
            .find(|member| member.id == id)
            .map(|member| member.position)
    }
}
