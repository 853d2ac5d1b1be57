use crate::constants::{
    CHAOS_RESHUFFLE_INTERVAL_MS, CHAOS_RUSH_PROBABILITY, MODE_TIMELINE, PANIC_REMAINING_THRESHOLD,
};
use crate::events::GameEvent;
use crate::rng::Rng;
use crate::types::{GameVariant, GhostMode, RoundStart};

pub mod variant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerPelletState {
    pub active: bool,
    pub remaining_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assignment {
    Fixed,
    Random,
    Rush,
}

#[derive(Clone, Debug)]
pub struct ModeScheduler {
    variant: GameVariant,
    cursor: usize,
    countdown_ms: u64,
    pellet: PowerPelletState,
    multiplier: i32,
    panic_latched: bool,
    reshuffle_interval_ms: u64,
    reshuffle_elapsed_ms: u64,
}

impl ModeScheduler {
    pub fn new(variant: GameVariant) -> Self {
        Self::with_reshuffle_interval(variant, CHAOS_RESHUFFLE_INTERVAL_MS)
    }

    pub fn with_reshuffle_interval(variant: GameVariant, interval_ms: u64) -> Self {
        Self {
            variant,
            cursor: 0,
            countdown_ms: 0,
            pellet: PowerPelletState::default(),
            multiplier: 1,
            panic_latched: false,
            reshuffle_interval_ms: interval_ms.max(1),
            reshuffle_elapsed_ms: 0,
        }
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.countdown_ms = 0;
        self.pellet = PowerPelletState::default();
        self.multiplier = 1;
        self.panic_latched = false;
        self.reshuffle_elapsed_ms = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pellet(&self) -> PowerPelletState {
        self.pellet
    }

    pub fn multiplier(&self) -> i32 {
        self.multiplier
    }

    pub fn is_panicking(&self) -> bool {
        self.panic_latched
    }

    // At most one event per kind: timeline, pellet expiry, chaos reshuffle.
    pub fn step(&mut self, dt_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.cursor < MODE_TIMELINE.len() {
            if dt_ms >= self.countdown_ms {
                let overshoot_ms = dt_ms - self.countdown_ms;
                let (duration_ms, mode) = MODE_TIMELINE[self.cursor];
                self.countdown_ms = duration_ms.saturating_sub(overshoot_ms);
                self.cursor += 1;
                events.push(GameEvent::ModeChanged { mode });
            } else {
                self.countdown_ms -= dt_ms;
            }
        }

        if self.pellet.active {
            self.pellet.remaining_ms = self.pellet.remaining_ms.saturating_sub(dt_ms);
            if self.pellet.remaining_ms == 0 {
                self.pellet.active = false;
                self.multiplier = 1;
                events.push(GameEvent::PelletStateChanged { active: false });
            }
        }

        if self.variant == GameVariant::Chaos {
            self.reshuffle_elapsed_ms += dt_ms;
            if self.reshuffle_elapsed_ms >= self.reshuffle_interval_ms {
                self.reshuffle_elapsed_ms %= self.reshuffle_interval_ms;
                events.push(GameEvent::TeamReshuffled);
            }
        }

        events
    }

    // Restarts the countdown rather than extending it.
    pub fn power_pellet_eaten(&mut self, duration_ms: u64, remaining: usize) -> Vec<GameEvent> {
        self.pellet = PowerPelletState {
            active: duration_ms > 0,
            remaining_ms: duration_ms,
        };
        let mut events = vec![GameEvent::PelletStateChanged {
            active: self.pellet.active,
        }];
        events.extend(self.check_panic(remaining));
        events
    }

    pub fn pellet_eaten(&mut self, remaining: usize) -> Vec<GameEvent> {
        self.check_panic(remaining).into_iter().collect()
    }

    pub fn ghost_captured(&mut self, points: i32) -> i32 {
        let awarded = points * self.multiplier;
        self.multiplier += 1;
        awarded
    }

    fn check_panic(&mut self, remaining: usize) -> Option<GameEvent> {
        if self.panic_latched || remaining == 0 || remaining > PANIC_REMAINING_THRESHOLD {
            return None;
        }
        self.panic_latched = true;
        Some(GameEvent::PanicTriggered)
    }

    // `None` keeps the current team.
    pub fn round_assignment(&self, reason: RoundStart) -> Option<Assignment> {
        match (self.variant, reason) {
            (GameVariant::Classic, _) => Some(Assignment::Fixed),
            (_, RoundStart::NewGame | RoundStart::Won) => Some(Assignment::Random),
            (_, RoundStart::Lost) => None,
        }
    }

    pub fn reshuffle_assignment(&self, remaining: usize, rng: &mut Rng) -> Assignment {
        if remaining <= PANIC_REMAINING_THRESHOLD && rng.chance(CHAOS_RUSH_PROBABILITY) {
            Assignment::Rush
        } else {
            Assignment::Random
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::POWER_DURATION_MS;

    fn modes(events: &[GameEvent]) -> Vec<GhostMode> {
        events
            .iter()
            .filter_map(|event| match event {
                GameEvent::ModeChanged { mode } => Some(*mode),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_tick_emits_scatter() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        assert_eq!(modes(&scheduler.step(10)), vec![GhostMode::Scatter]);
        assert_eq!(scheduler.cursor(), 1);
        assert!(scheduler.step(10).is_empty());
    }

    #[test]
    fn timeline_emits_each_transition_once_then_holds() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        let mut seen = modes(&scheduler.step(0));
        for (duration_ms, _) in MODE_TIMELINE.iter().take(MODE_TIMELINE.len() - 1) {
            seen.extend(modes(&scheduler.step(duration_ms - 1)));
            seen.extend(modes(&scheduler.step(1)));
        }
        let expected: Vec<GhostMode> = MODE_TIMELINE.iter().map(|(_, mode)| *mode).collect();
        assert_eq!(seen, expected);
        assert_eq!(scheduler.cursor(), MODE_TIMELINE.len());

        for _ in 0..100 {
            assert!(scheduler.step(60_000).is_empty());
        }
    }

    #[test]
    fn chase_arrives_one_scatter_length_after_round_start() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        let mut emitted = Vec::new();
        for tick in 1..=701u64 {
            for mode in modes(&scheduler.step(10)) {
                emitted.push((tick * 10, mode));
            }
        }
        assert_eq!(
            emitted,
            vec![(10, GhostMode::Scatter), (7_000, GhostMode::Chase)]
        );
    }

    #[test]
    fn coarse_ticks_do_not_drift_from_the_timeline() {
        let mut boundaries = Vec::new();
        let mut at_ms = 0;
        for (duration_ms, mode) in MODE_TIMELINE {
            boundaries.push((at_ms, mode));
            at_ms += duration_ms;
        }

        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        let mut emitted = Vec::new();
        for tick in 1..=3_000u64 {
            for mode in modes(&scheduler.step(30)) {
                emitted.push((tick * 30, mode));
            }
        }
        assert_eq!(emitted.len(), MODE_TIMELINE.len());
        assert_eq!(emitted[0], (30, GhostMode::Scatter));
        for ((at_ms, mode), (boundary_ms, expected)) in emitted.iter().zip(&boundaries).skip(1) {
            assert_eq!(mode, expected);
            assert!(
                (*boundary_ms..boundary_ms + 30).contains(at_ms),
                "{mode:?} at {at_ms} for boundary {boundary_ms}"
            );
        }
    }

    #[test]
    fn large_step_emits_only_one_mode_change() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        scheduler.step(1);
        assert_eq!(modes(&scheduler.step(200_000)), vec![GhostMode::Chase]);
        assert_eq!(scheduler.cursor(), 2);
    }

    #[test]
    fn pellet_with_few_items_left_triggers_panic_and_expires() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        scheduler.step(10);
        let events = scheduler.power_pellet_eaten(POWER_DURATION_MS, 15);
        assert_eq!(
            events,
            vec![
                GameEvent::PelletStateChanged { active: true },
                GameEvent::PanicTriggered
            ]
        );
        assert_eq!(scheduler.ghost_captured(100), 100);
        assert_eq!(scheduler.ghost_captured(100), 200);
        assert_eq!(scheduler.multiplier(), 3);

        let mut expired = false;
        for _ in 0..801 {
            for event in scheduler.step(10) {
                if event == (GameEvent::PelletStateChanged { active: false }) {
                    assert!(!expired);
                    expired = true;
                }
            }
        }
        assert!(expired);
        assert!(!scheduler.pellet().active);
        assert_eq!(scheduler.multiplier(), 1);
    }

    #[test]
    fn second_pellet_restarts_the_countdown() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        scheduler.power_pellet_eaten(8_000, 100);
        scheduler.step(6_000);
        scheduler.power_pellet_eaten(8_000, 99);
        assert_eq!(scheduler.pellet().remaining_ms, 8_000);
        scheduler.step(7_990);
        assert!(scheduler.pellet().active);
        scheduler.step(10);
        assert!(!scheduler.pellet().active);
    }

    #[test]
    fn panic_fires_once_per_round() {
        let mut scheduler = ModeScheduler::new(GameVariant::Extended);
        assert!(scheduler.pellet_eaten(21).is_empty());
        assert_eq!(scheduler.pellet_eaten(20), vec![GameEvent::PanicTriggered]);
        assert!(scheduler.pellet_eaten(19).is_empty());
        assert_eq!(
            scheduler.power_pellet_eaten(8_000, 18),
            vec![GameEvent::PelletStateChanged { active: true }]
        );
        assert!(scheduler.is_panicking());

        scheduler.reset();
        assert!(!scheduler.is_panicking());
        assert_eq!(scheduler.pellet_eaten(3), vec![GameEvent::PanicTriggered]);
    }

    #[test]
    fn last_item_does_not_panic() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        assert!(scheduler.pellet_eaten(0).is_empty());
    }

    #[test]
    fn reset_rewinds_everything() {
        let mut scheduler = ModeScheduler::new(GameVariant::Classic);
        scheduler.step(1);
        scheduler.step(7_000);
        scheduler.power_pellet_eaten(8_000, 5);
        scheduler.ghost_captured(100);
        scheduler.reset();
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.pellet(), PowerPelletState::default());
        assert_eq!(scheduler.multiplier(), 1);
        assert_eq!(modes(&scheduler.step(10)), vec![GhostMode::Scatter]);
    }

    #[test]
    fn only_chaos_reshuffles_on_a_timer() {
        let mut chaos = ModeScheduler::new(GameVariant::Chaos);
        let mut extended = ModeScheduler::new(GameVariant::Extended);
        let mut reshuffles = 0;
        for _ in 0..(36_000 / 50) {
            reshuffles += chaos
                .step(50)
                .iter()
                .filter(|event| **event == GameEvent::TeamReshuffled)
                .count();
            assert!(!extended.step(50).contains(&GameEvent::TeamReshuffled));
        }
        assert_eq!(reshuffles, 3);
    }

    #[test]
    fn round_assignment_per_variant() {
        let classic = ModeScheduler::new(GameVariant::Classic);
        let extended = ModeScheduler::new(GameVariant::Extended);
        for reason in [RoundStart::NewGame, RoundStart::Won, RoundStart::Lost] {
            assert_eq!(classic.round_assignment(reason), Some(Assignment::Fixed));
        }
        assert_eq!(
            extended.round_assignment(RoundStart::Won),
            Some(Assignment::Random)
        );
        assert_eq!(extended.round_assignment(RoundStart::Lost), None);
    }

    #[test]
    fn rush_only_happens_near_the_end() {
        let scheduler = ModeScheduler::new(GameVariant::Chaos);
        let mut rng = Rng::new(9);
        for _ in 0..500 {
            assert_eq!(
                scheduler.reshuffle_assignment(21, &mut rng),
                Assignment::Random
            );
        }
        let rushes = (0..10_000)
            .filter(|_| scheduler.reshuffle_assignment(20, &mut rng) == Assignment::Rush)
            .count();
        assert!((1_500..=2_500).contains(&rushes), "rushes={rushes}");
    }
}
