// Library exports for the lookahead Battlesnake
// The server binary, the replay tool and the integration tests all use the
// decision engine through this crate.

pub mod ascii;
pub mod behavior;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod handler;
pub mod heuristics;
pub mod lookahead;
pub mod occupancy;
pub mod pathfinding;
pub mod replay;
pub mod rollout;
pub mod selector;
pub mod simulator;
pub mod snapshot;
pub mod types;
