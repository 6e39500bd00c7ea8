//! Infinite Climber - simulation core of an endless vertical platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain generation, AI, collisions, game state)
//! - `tuning`: Data-driven game balance loaded from JSON
//! - `leaderboard`: Score persistence collaborator with failure isolation
//! - `error`: Typed errors for the config and leaderboard boundaries
//! - `logging`: `env_logger` setup for the headless runner

pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, LeaderboardError};
pub use leaderboard::{
    JsonFileLeaderboard, Leaderboard, MemoryLeaderboard, ScoreSubmission, UnavailableLeaderboard,
    submit_safely,
};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Screen convention: `y` grows downward, so climbing means decreasing `y`.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the frame driver
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const LEVEL_WIDTH: f32 = 1024.0;
    pub const VIEW_HEIGHT: f32 = 768.0;
    /// Ground tier sits this far above the bottom of the first view
    pub const GROUND_OFFSET: f32 = 100.0;

    /// Physics
    pub const GRAVITY: f32 = 800.0;
    pub const HERO_SPEED: f32 = 250.0;
    pub const HERO_JUMP_VELOCITY: f32 = 520.0;
    pub const HERO_DOUBLE_JUMP_VELOCITY: f32 = 450.0;
    pub const HERO_BODY_WIDTH: f32 = 30.0;
    pub const HERO_BODY_HEIGHT: f32 = 50.0;

    /// Level generation
    pub const BASE_VERTICAL_GAP: f32 = 150.0;
    pub const PLATFORM_MIN_WIDTH: f32 = 150.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 350.0;
    pub const TILE_SIZE: f32 = 32.0;
    pub const MIN_PLATFORM_GAP: f32 = 80.0;
    pub const EDGE_JITTER: f32 = 100.0;
    pub const INITIAL_TIERS: u32 = 5;
    /// Safety factor applied to jump kinematics, and again to pair checks
    pub const JUMP_SAFETY_FACTOR: f32 = 0.9;

    /// Hero
    pub const HERO_START_LIVES: u32 = 10;
    pub const INVULNERABILITY_TIME: f32 = 2.0;
    pub const HURT_DURATION: f32 = 0.5;
    pub const HURT_FLASH_DURATION: f32 = 2.2;
    pub const HURT_FLASH_PERIOD: f32 = 0.1;
    pub const DEATH_DELAY: f32 = 1.0;

    /// Enemies
    pub const ENEMY_SPEED: f32 = 80.0;
    pub const ENEMY_RADIUS: f32 = 20.0;
    pub const ENEMY_EDGE_MARGIN: f32 = 20.0;
    pub const ENEMY_CHASE_BAND: f32 = 100.0;
    pub const ENEMY_DEAD_ZONE: f32 = 4.0;

    /// Collectibles
    pub const COLLECTIBLES_PER_TIER: u32 = 3;
    pub const COLLECTIBLE_RADIUS: f32 = 16.0;
    pub const COLLECTIBLE_BASE_VALUE: f32 = 10.0;
    pub const COLLECT_ANIMATION_TIME: f32 = 0.2;
    pub const TRAIL_LENGTH: u32 = 3;

    /// Camera
    pub const CAMERA_LERP: f32 = 0.1;
    pub const CAMERA_OFFSET_Y: f32 = 300.0;
    pub const LOOKAHEAD_GAPS: f32 = 3.0;

    /// Recycling and recovery
    pub const RECYCLE_DISTANCE: f32 = 1200.0;
    pub const FALL_MARGIN: f32 = 200.0;

    /// Combat
    pub const STOMP_TOLERANCE: f32 = 20.0;
    pub const STOMP_BOUNCE: f32 = 200.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
