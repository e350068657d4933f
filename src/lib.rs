//! Brickfall - a deterministic brick breaker simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, power-ups, levels, scoring)
//! - `snapshot`: Immutable render snapshots and a lock-light publisher for presentation threads
//! - `tuning`: Data-driven game balance
//! - `error`: Construction and configuration errors

pub mod error;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{SimError, SimResult};
pub use snapshot::{RenderSnapshot, SnapshotPublisher};
pub use tuning::{BounceModel, FinalLevelPolicy, RuleSet, Tuning};

/// Default gameplay constants (authoritative terminal rule set)
///
/// Distances are in play-field cells, speeds in cells per tick.
pub mod consts {
    /// Host tick rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;

    /// Default play area
    pub const PLAY_WIDTH: f32 = 60.0;
    pub const PLAY_HEIGHT: f32 = 30.0;

    /// Session
    pub const START_LIVES: u8 = 3;
    pub const MAX_BALLS: usize = 16;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const LAUNCH_SPEED: f32 = 0.5;

    /// Paddle defaults
    pub const PADDLE_BASE_WIDTH: f32 = 9.0;
    pub const PADDLE_EXTENDED_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 1.0;
    pub const PADDLE_BOTTOM_OFFSET: f32 = 2.0;
    pub const PADDLE_SPEED: f32 = 1.0;

    /// Bounce shaping: softens the paddle center, sharpens the edges
    pub const BOUNCE_EXPONENT: f32 = 0.65;
    pub const MAX_BOUNCE_VX: f32 = 0.6;
    pub const MIN_BOUNCE_VX: f32 = 0.15;

    /// Brick grid
    pub const GRID_COLS: usize = 10;
    pub const GRID_ROWS: usize = 6;
    pub const GRID_TOP_OFFSET: f32 = 3.0;
    pub const BRICK_HEIGHT: f32 = 1.0;
    pub const BRICK_GAP: f32 = 0.2;

    /// Scoring
    pub const POINTS_PER_BRICK: u64 = 10;
    pub const POPUP_LIFETIME_TICKS: u32 = 30;
    pub const POPUP_RISE: f32 = 0.05;

    /// Power-ups
    pub const POWERUP_CHANCE: f64 = 0.2;
    pub const POWERUP_WIDTH: f32 = 3.0;
    pub const POWERUP_HEIGHT: f32 = 1.0;
    pub const POWERUP_FALL_STEP: f32 = 0.5;
    /// Power-ups move on every Nth tick
    pub const POWERUP_FALL_INTERVAL: u32 = 3;
    pub const CATCH_MARGIN: f32 = 1.0;
    pub const MULTIBALL_SPREAD: f32 = 0.3;
    pub const EXTEND_DURATION_TICKS: u32 = 600;
    pub const BLINK_WINDOW_TICKS: u32 = 120;
    pub const BLINK_INTERVAL_TICKS: u32 = 10;

    /// Desktop build constants kept for the legacy rule set
    pub const LEGACY_EXTEND_DURATION_TICKS: u32 = 300;
    pub const LEGACY_MIN_BOUNCE_VX: f32 = 0.2;
}
