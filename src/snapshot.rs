//! Render snapshots
//!
//! A [`RenderSnapshot`] is an owned copy of everything a presentation layer
//! draws. The simulation thread publishes one per tick; readers clone the
//! latest `Arc` and never touch live [`GameState`].

use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec2;
use serde::Serialize;

use crate::sim::geometry::Rect;
use crate::sim::state::{BrickColor, GamePhase, GameState, PowerUpKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrickView {
    pub col: usize,
    pub row: usize,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: BrickColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PowerUpKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupView {
    pub pos: Vec2,
    pub text: String,
    /// 1.0 when spawned, fading linearly to 0.0
    pub opacity: f32,
    pub multiplier: bool,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub area: Rect,
    pub bricks: Vec<BrickView>,
    pub balls: Vec<BallView>,
    pub powerups: Vec<PowerUpView>,
    pub popups: Vec<PopupView>,
    pub paddle_x: f32,
    pub paddle_y: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle extension about to expire
    pub paddle_blink: bool,
    pub ball_ready: bool,
    pub paused: bool,
    pub game_over: bool,
    pub elapsed_seconds: f32,
    pub score: u64,
    pub high_score: u64,
    /// 1-based
    pub level: u32,
    pub lives: u8,
}

impl RenderSnapshot {
    /// Copy the drawable parts of the current state
    pub fn project(state: &GameState) -> Self {
        let bricks = state
            .grid
            .visible_bricks()
            .map(|b| BrickView {
                col: b.col,
                row: b.row,
                pos: b.pos,
                size: b.size,
                color: b.color,
            })
            .collect();

        let balls = state
            .balls
            .iter()
            .map(|b| BallView {
                pos: b.pos,
                radius: b.radius,
            })
            .collect();

        let powerups = state
            .powerups
            .iter()
            .map(|p| PowerUpView {
                pos: p.pos,
                size: p.size,
                kind: p.kind,
            })
            .collect();

        let popups = state
            .popups
            .iter()
            .map(|p| PopupView {
                pos: p.pos,
                text: p.text.clone(),
                opacity: p.opacity(),
                multiplier: p.multiplier,
            })
            .collect();

        Self {
            area: state.area,
            bricks,
            balls,
            powerups,
            popups,
            paddle_x: state.paddle.x,
            paddle_y: state.paddle.y,
            paddle_width: state.paddle.width,
            paddle_height: state.paddle.height,
            paddle_blink: state.effects.blink,
            ball_ready: state.is_ready(),
            paused: state.phase == GamePhase::Paused,
            game_over: state.phase == GamePhase::GameOver,
            elapsed_seconds: state.elapsed_ticks as f32 / state.tuning.tick_rate,
            score: state.score,
            high_score: state.high_score,
            level: state.level(),
            lives: state.lives,
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "level {} score {} lives {} balls {} bricks {} t={:.1}s",
            self.level,
            self.score,
            self.lives,
            self.balls.len(),
            self.bricks.len(),
            self.elapsed_seconds
        )
    }
}

/// Single-writer, many-reader handoff of the latest snapshot
#[derive(Debug)]
pub struct SnapshotPublisher {
    latest: Mutex<Arc<RenderSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(initial: RenderSnapshot) -> Self {
        Self {
            latest: Mutex::new(Arc::new(initial)),
        }
    }

    /// Replace the published snapshot
    pub fn publish(&self, snapshot: RenderSnapshot) {
        let snapshot = Arc::new(snapshot);
        // The lock only guards a pointer swap, so a poisoned value is still whole
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = snapshot;
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<RenderSnapshot> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&latest)
    }
}
