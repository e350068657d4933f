//! Power-up spawning, falling, pickup and timed effects

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, GameEvent, GameState, PowerUp, PowerUpKind};

/// Roll for a power-up drop at a destroyed brick
pub fn maybe_spawn(state: &mut GameState, at: Vec2) -> bool {
    if !state.rng.random_bool(state.tuning.powerup_chance) {
        return false;
    }
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    spawn(state, kind, at);
    true
}

/// Drop a power-up centered on `center`
pub fn spawn(state: &mut GameState, kind: PowerUpKind, center: Vec2) {
    let size = Vec2::new(state.tuning.powerup_width, state.tuning.powerup_height);
    state.powerups.push(PowerUp {
        pos: center - size / 2.0,
        size,
        kind,
        fall_step: state.tuning.powerup_fall_step,
        fall_timer: 0,
    });
    log::trace!("Spawned {:?} at ({}, {})", kind, center.x, center.y);
}

/// Fall on the throttled cadence, then catch or drop each power-up
pub fn update(state: &mut GameState) {
    let catch_zone = state.paddle.rect().widened(state.tuning.catch_margin);
    let paddle_bottom = state.paddle.y + state.paddle.height;
    let interval = state.tuning.powerup_fall_interval;

    let mut caught = Vec::new();
    state.powerups.retain_mut(|powerup| {
        powerup.fall_timer += 1;
        if powerup.fall_timer >= interval {
            powerup.fall_timer = 0;
            powerup.pos.y += powerup.fall_step;
        }

        if powerup.rect().intersects(&catch_zone) {
            caught.push(powerup.kind);
            false
        } else {
            // Past the paddle row: gone without effect
            powerup.pos.y <= paddle_bottom
        }
    });

    for kind in caught {
        apply(state, kind);
    }
}

/// Activate a caught power-up's effect
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    log::debug!("Collected {:?}", kind);
    state.events.push(GameEvent::PowerUpCollected { kind });

    match kind {
        PowerUpKind::MultiBall => {
            let radius = state.tuning.ball_radius;
            let origin = Vec2::new(state.paddle.center_x(), state.paddle.y - radius);
            for direction in [-1.0, 1.0] {
                if state.balls.len() >= state.tuning.max_balls {
                    log::debug!("Ball cap {} reached, skipping spawn", state.tuning.max_balls);
                    break;
                }
                let vel = Vec2::new(
                    direction * state.tuning.multiball_spread,
                    -state.tuning.launch_speed,
                );
                state.balls.push(Ball::new(origin, vel, radius));
            }
        }
        PowerUpKind::PaddleExtend => {
            let extended = state.tuning.paddle_extended_width;
            if state.paddle.width < extended {
                state.paddle.set_width_centered(extended, &state.area);
            }
            state.effects.extend_ticks = state.tuning.extend_duration_ticks;
            state.effects.blink = false;
        }
    }
}

/// Count down the paddle extension and restore the base width at zero
pub fn tick_effects(state: &mut GameState) {
    if state.effects.extend_ticks == 0 {
        return;
    }
    state.effects.extend_ticks -= 1;

    let remaining = state.effects.extend_ticks;
    if remaining == 0 {
        let base = state.paddle.base_width;
        state.paddle.set_width_centered(base, &state.area);
        state.effects.blink = false;
        log::debug!("Paddle extension expired");
    } else {
        state.effects.blink = blink_flag(
            remaining,
            state.tuning.blink_window_ticks,
            state.tuning.blink_interval_ticks,
        );
    }
}

/// Alternating flag during the trailing window before expiry
pub fn blink_flag(remaining: u32, window: u32, interval: u32) -> bool {
    remaining <= window && (remaining / interval.max(1)) % 2 == 0
}
