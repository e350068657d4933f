//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod powerup;
pub mod score;
pub mod state;
pub mod tick;

pub use collision::{BrickHit, CollisionOutcome, resolve, shape_bounce};
pub use geometry::{Rect, circle_rect_overlap};
pub use level::{BrickGrid, GridLayout, LevelDirector, LevelTemplate, TemplateBrick};
pub use state::{
    ActiveEffects, Ball, Brick, BrickColor, GameEvent, GamePhase, GameState, Paddle, PowerUp,
    PowerUpKind, ScorePopup,
};
pub use tick::{TickInput, tick};
