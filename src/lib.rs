pub mod agent;
pub mod behavior;
pub mod constants;
pub mod director;
pub mod events;
pub mod maze;
pub mod pool;
pub mod rng;
pub mod scheduler;
pub mod targeting;
pub mod team;
pub mod types;
