use crate::types::{Coord, GhostMode};

pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MODE_TIMELINE: [(u64, GhostMode); 8] = [
    (7_000, GhostMode::Scatter),
    (20_000, GhostMode::Chase),
    (7_000, GhostMode::Scatter),
    (20_000, GhostMode::Chase),
    (5_000, GhostMode::Scatter),
    (20_000, GhostMode::Chase),
    (5_000, GhostMode::Scatter),
    (20_000, GhostMode::Chase),
];

pub const POWER_DURATION_MS: u64 = 8_000;
pub const PANIC_REMAINING_THRESHOLD: usize = 20;

pub const TARGET_NOISE_PROBABILITY: f32 = 0.05;

pub const PINKY_LOOKAHEAD: f32 = 3.0;
pub const INKY_LOOKAHEAD: f32 = 1.5;
pub const CLYDE_SHY_DISTANCE: f32 = 12.0;
pub const SPUNKY_SIGHT_RANGE: f32 = 18.0;
pub const FUNKY_WAYPOINT_EPSILON: f32 = 0.2;

// Corner tiles of DEMO_LAYOUT; patrol waypoints must sit on maze nodes.
pub const MAZE_CORNERS: [Coord; 4] = [
    Coord::new(10.0, 12.0),
    Coord::new(-10.0, 12.0),
    Coord::new(-10.0, -12.0),
    Coord::new(10.0, -12.0),
];

pub const CHAOS_RESHUFFLE_INTERVAL_MS: u64 = 12_000;
pub const CHAOS_RUSH_PROBABILITY: f32 = 0.2;

pub const GHOST_BASE_SPEED: f32 = 4.0;
pub const GHOST_EATEN_SPEED_MULTIPLIER: f32 = 2.0;
pub const PLAYER_BASE_SPEED: f32 = 4.5;

pub const GHOST_CAPTURE_POINTS: i32 = 100;
pub const PELLET_POINTS: i32 = 10;
pub const POWER_PELLET_POINTS: i32 = 50;
pub const STARTING_LIVES: i32 = 3;
