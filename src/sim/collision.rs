//! Per-ball collision detection and response
//!
//! Discrete per-tick checks against walls, the paddle and the brick grid.
//! Brick tests split the step into its horizontal and vertical parts so a
//! ball cannot slip diagonally between two bricks.

use glam::Vec2;

use super::geometry::Rect;
use super::level::BrickGrid;
use super::score;
use super::state::{Ball, Paddle};
use crate::tuning::{BounceModel, Tuning};

/// Smallest share of the total speed kept vertical by the constant-speed bounce
const MIN_VERTICAL_FRACTION: f32 = 0.3;

/// A destroyed brick, as reported to scoring and power-up spawning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickHit {
    pub col: usize,
    pub row: usize,
    pub points: u64,
    /// Streak value that produced `points`
    pub multiplier: u32,
    /// Center of the destroyed brick
    pub center: Vec2,
}

/// Result of resolving one ball for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Ball left through the floor
    pub removed: bool,
    /// Canonical hit (the horizontal one when both axes hit)
    pub brick_hit: Option<BrickHit>,
    /// Vertical hit in a tick that also had a horizontal hit
    pub secondary_hit: Option<BrickHit>,
    pub paddle_hit: bool,
}

impl CollisionOutcome {
    /// Every brick destroyed this tick, canonical first
    pub fn hits(&self) -> impl Iterator<Item = BrickHit> + '_ {
        self.brick_hit.iter().chain(self.secondary_hit.iter()).copied()
    }
}

/// Advance one ball and resolve its collisions
pub fn resolve(
    ball: &mut Ball,
    grid: &mut BrickGrid,
    paddle: &Paddle,
    bounds: &Rect,
    tuning: &Tuning,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let prev = ball.pos;
    let r = ball.radius;

    // Advance
    let dx = ball.horizontal_step(tuning.quantize_horizontal);
    ball.pos += Vec2::new(dx, ball.vel.y);

    // Walls and ceiling
    if ball.pos.x <= bounds.left + r {
        ball.pos.x = bounds.left + r;
        ball.vel.x = ball.vel.x.abs();
        ball.carry = 0.0;
    } else if ball.pos.x >= bounds.right() - r {
        ball.pos.x = bounds.right() - r;
        ball.vel.x = -ball.vel.x.abs();
        ball.carry = 0.0;
    }
    if ball.pos.y <= bounds.top + r {
        ball.pos.y = bounds.top + r;
        ball.vel.y = ball.vel.y.abs();
    }

    // Paddle: only while falling onto its top edge
    if ball.vel.y > 0.0 {
        let crossed = prev.y + r <= paddle.y && ball.pos.y + r >= paddle.y;
        let in_span = paddle.rect().widened(r).contains_x(ball.pos.x);
        if crossed && in_span {
            bounce_off_paddle(ball, paddle, bounds, tuning);
            outcome.paddle_hit = true;
        }
    }

    // Bricks, horizontal step first
    let mut horizontal = None;
    if ball.pos.x != prev.x {
        if let Some((col, row)) = grid.brick_at(Vec2::new(ball.pos.x, prev.y), r) {
            horizontal = destroy_brick(ball, grid, col, row, tuning);
            ball.vel.x = -ball.vel.x;
            ball.carry = 0.0;
            ball.pos.x = prev.x;
        }
    }

    let mut vertical = None;
    if ball.pos.y != prev.y {
        if let Some((col, row)) = grid.brick_at(ball.pos, r) {
            vertical = destroy_brick(ball, grid, col, row, tuning);
            ball.vel.y = -ball.vel.y;
            ball.pos.y = prev.y;
        }
    }

    match (horizontal, vertical) {
        (Some(h), v) => {
            outcome.brick_hit = Some(h);
            outcome.secondary_hit = v;
        }
        (None, v) => outcome.brick_hit = v,
    }

    // Floor: the center has left the field
    if ball.pos.y > bounds.bottom() {
        outcome.removed = true;
    }

    outcome
}

fn destroy_brick(
    ball: &mut Ball,
    grid: &mut BrickGrid,
    col: usize,
    row: usize,
    tuning: &Tuning,
) -> Option<BrickHit> {
    let center = grid.get(col, row)?.center();
    if !grid.destroy(col, row) {
        return None;
    }
    let (points, multiplier) = score::register_hit(ball, tuning.points_per_brick);
    Some(BrickHit {
        col,
        row,
        points,
        multiplier,
        center,
    })
}

fn bounce_off_paddle(ball: &mut Ball, paddle: &Paddle, bounds: &Rect, tuning: &Tuning) {
    let speed = ball.vel.length();
    let vx = shape_bounce(ball.pos.x - paddle.x, paddle.width, ball.pos.x, bounds, tuning);

    let vy = match tuning.bounce_model {
        BounceModel::Classic => -ball.vel.y.abs(),
        BounceModel::ConstantSpeed => {
            let min_vy = speed * MIN_VERTICAL_FRACTION;
            -(speed * speed - vx * vx).max(min_vy * min_vy).sqrt()
        }
    };

    ball.vel = Vec2::new(vx, vy);
    ball.pos.y = paddle.y - ball.radius;
    ball.carry = 0.0;
    score::reset_streak(ball);
}

/// Horizontal speed after a paddle hit at `offset` from the paddle's left edge
///
/// `t` runs from -1 (left edge) to 1 (right edge) and is shaped as
/// `sign(t) * |t|^exponent`. Results slower than the minimum are pushed to the
/// minimum, signed toward the half of the field the ball is in.
pub fn shape_bounce(
    offset: f32,
    paddle_width: f32,
    ball_x: f32,
    bounds: &Rect,
    tuning: &Tuning,
) -> f32 {
    let half = paddle_width / 2.0;
    let h = offset.clamp(0.0, paddle_width);
    let t = ((h - half) / half).clamp(-1.0, 1.0);
    let shaped = t.signum() * t.abs().powf(tuning.bounce_exponent) * tuning.max_bounce_vx;

    if shaped.abs() < tuning.min_bounce_vx {
        let toward = if ball_x < bounds.center().x { -1.0 } else { 1.0 };
        toward * tuning.min_bounce_vx
    } else {
        shaped
    }
}
