//! Jungle Jump - a vertical jump-on-platforms arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, camera, spawning)
//! - `game_loop`: Fixed timestep driver
//! - `highscores`: Top-10 leaderboard table and its wire format
//! - `leaderboard`: Fetch/save flow over chunked persistence
//! - `persistence`: Chunked storage on a size-limited key-value backend
//! - `platform`: Browser bindings
//! - `settings`: Persisted player preferences
//! - `tuning`: Data-driven game balance per difficulty

pub mod game_loop;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game_loop::{FrameReport, GameLoop, GameSummary};
pub use highscores::{Entry, LeaderboardTable};
pub use leaderboard::{Leaderboard, LeaderboardError, SaveOutcome};
pub use settings::Settings;
pub use tuning::{Difficulty, Tuning};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: f64 = 60.0;
    /// Fixed simulation timestep in milliseconds
    pub const TICK_MS: f64 = 1000.0 / SIM_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 16;
    /// Longest frame delta fed into the accumulator
    pub const MAX_FRAME_MS: f64 = 250.0;

    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Player is a circle of this radius
    pub const PLAYER_RADIUS: f32 = 30.0;
    /// Player spawn height above the bottom of the field
    pub const PLAYER_START_OFFSET: f32 = 150.0;

    pub const PLATFORM_HEIGHT: f32 = 15.0;
    pub const BEDROCK_HEIGHT: f32 = PLATFORM_HEIGHT * 2.0;
    /// Bedrock center sits this far above the bottom edge of the screen
    pub const BEDROCK_SCREEN_OFFSET: f32 = 10.0;
    /// Lowest initial platform sits this far above the bottom edge
    pub const FIRST_PLATFORM_OFFSET: f32 = 50.0;
    /// Horizontal margin kept free when placing platforms
    pub const SPAWN_MARGIN: f32 = 20.0;
    pub const INITIAL_PLATFORMS: usize = 8;

    /// Upward distance from the start before the bedrock is removed
    pub const BEDROCK_THRESHOLD: f32 = 500.0;
    /// Camera keeps the player this fraction of the screen below its top
    pub const CAMERA_FRACTION: f32 = 0.6;
    /// Platforms further than this below the screen are culled
    pub const CULL_MARGIN: f32 = 100.0;

    pub const SCORE_PER_BOUNCE: u64 = 10;
}
