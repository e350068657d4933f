//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Per tick, in
//! order: input, effect timers, score popups, ball collisions, ball-loss
//! transitions, power-ups, level completion.

use super::collision;
use super::powerup;
use super::score;
use super::state::{GameEvent, GamePhase, GameState};
use crate::tuning::FinalLevelPolicy;

/// Input facts for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move paddle left (held)
    pub left: bool,
    /// Move paddle right (held)
    pub right: bool,
    /// Launch the parked ball (edge)
    pub launch: bool,
    /// Pause toggle (edge)
    pub pause: bool,
    /// Start over after game over (edge)
    pub restart: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        state.toggle_pause();
    }
    if input.restart && state.phase == GamePhase::GameOver {
        state.restart();
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        _ => {}
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    state.elapsed_ticks += 1;

    // Paddle follows held directions
    let direction = input.right as i8 - input.left as i8;
    if direction != 0 {
        let dx = direction as f32 * state.tuning.paddle_speed;
        state.paddle.move_by(dx, &state.area);
    }

    if state.phase == GamePhase::Ready {
        for ball in &mut state.balls {
            ball.park_on(&state.paddle);
        }
        if input.launch {
            state.launch();
            log::debug!("Ball launched");
        }
    }

    powerup::tick_effects(state);
    score::advance_popups(&mut state.popups, state.tuning.popup_rise);

    if state.phase == GamePhase::Active {
        resolve_balls(state);
        if state.balls.is_empty() {
            on_all_balls_lost(state);
        }
        if state.phase == GamePhase::Active {
            powerup::update(state);
        }
    }

    let playing = matches!(state.phase, GamePhase::Active | GamePhase::Ready);
    if playing && state.levels.all_cleared(&state.grid) {
        complete_level(state);
    }
}

/// Move every ball, then score and roll drops for the bricks they broke
fn resolve_balls(state: &mut GameState) {
    let mut hits = Vec::new();
    let GameState {
        balls,
        grid,
        paddle,
        area,
        tuning,
        ..
    } = state;

    balls.retain_mut(|ball| {
        let outcome = collision::resolve(ball, grid, paddle, area, tuning);
        hits.extend(outcome.hits());
        !outcome.removed
    });

    for hit in &hits {
        score::award(state, hit);
        powerup::maybe_spawn(state, hit.center);
    }
}

fn on_all_balls_lost(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.powerups.clear();
    state.events.push(GameEvent::LifeLost { lives: state.lives });

    if state.lives == 0 {
        end_game(state);
    } else {
        log::debug!("Ball lost, {} lives left", state.lives);
        state.spawn_parked_ball();
        state.phase = GamePhase::Ready;
    }
}

fn end_game(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    score::record_high_score(state);
    state.events.push(GameEvent::GameOver {
        final_score: state.score,
    });
    log::info!(
        "Game over at level {} with score {}",
        state.level(),
        state.score
    );
}

fn complete_level(state: &mut GameState) {
    state.phase = GamePhase::LevelTransition;
    log::info!("Level {} cleared", state.level());

    if !state.levels.advance() {
        match state.tuning.final_level_policy {
            FinalLevelPolicy::Wrap => {
                log::info!("Final level cleared, wrapping to level 1");
                state.levels.reset();
            }
            FinalLevelPolicy::EndGame => {
                end_game(state);
                return;
            }
        }
    }
    state.load_current_level();
}

/// Steer under the lowest falling ball, or toward a falling power-up when no ball is coming down
fn autopilot(state: &GameState, input: &mut TickInput) {
    if state.phase == GamePhase::Ready {
        input.launch = true;
    }

    let falling_ball = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let target_x = match falling_ball {
        Some(ball) => Some(ball.pos.x),
        None => state
            .powerups
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|p| p.pos.x + p.size.x / 2.0)
            .or_else(|| state.balls.first().map(|b| b.pos.x)),
    };

    let Some(target_x) = target_x else {
        return;
    };

    // Oscillating aim offset so rallies don't settle into a loop
    let time_factor = state.elapsed_ticks as f32 * 0.05;
    let offset = time_factor.sin() * state.paddle.width * 0.3;
    let delta = target_x + offset - state.paddle.center_x();
    let deadzone = state.tuning.paddle_speed / 2.0;

    input.left = delta < -deadzone;
    input.right = delta > deadzone;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Rect;
    use crate::sim::level::LevelDirector;
    use crate::sim::state::PowerUpKind;
    use crate::snapshot::RenderSnapshot;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 60.0, 30.0)
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            powerup_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn state_with(patterns: &[&[&str]], tuning: Tuning) -> GameState {
        let levels = LevelDirector::from_patterns(10, 6, patterns).unwrap();
        let mut state = GameState::with_levels(area(), tuning, 1, levels).unwrap();
        state.drain_events();
        state
    }

    /// Active game whose only brick sits far from the test balls
    fn active_state() -> GameState {
        let mut state = state_with(&[&[".........#"]], quiet_tuning());
        state.launch();
        state
    }

    fn launch() -> TickInput {
        TickInput {
            launch: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_ready_to_active() {
        let mut state = GameState::new(area(), Tuning::default(), 12345).unwrap();
        assert_eq!(state.phase, GamePhase::Ready);

        // Tick without launch - should stay Ready
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Ready);

        tick(&mut state, &launch());
        assert_eq!(state.phase, GamePhase::Active);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, -state.tuning.launch_speed));
    }

    #[test]
    fn test_parked_ball_follows_paddle() {
        let mut state = GameState::new(area(), Tuning::default(), 1).unwrap();
        let x = state.paddle.x;
        let input = TickInput {
            right: true,
            ..Default::default()
        };

        tick(&mut state, &input);

        assert_eq!(state.paddle.x, x + state.tuning.paddle_speed);
        assert_eq!(state.balls[0].pos.x, state.paddle.center_x());
        assert_eq!(state.phase, GamePhase::Ready);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(area(), Tuning::default(), 12345).unwrap();
        tick(&mut state, &launch());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);

        // Nothing moves while paused
        let frozen = RenderSnapshot::project(&state);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(RenderSnapshot::project(&state), frozen);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Active);
    }

    #[test]
    fn test_even_pause_toggles_are_idempotent() {
        let mut state = GameState::new(area(), Tuning::default(), 99).unwrap();
        for _ in 0..20 {
            tick(&mut state, &launch());
        }
        let before = RenderSnapshot::project(&state);

        for _ in 0..4 {
            state.toggle_pause();
        }

        assert_eq!(RenderSnapshot::project(&state), before);
        assert_eq!(state.phase, GamePhase::Active);
    }

    #[test]
    fn test_life_lost_returns_to_ready() {
        let mut state = active_state();
        state.balls[0].pos = Vec2::new(5.0, 29.9);
        state.balls[0].vel = Vec2::new(0.0, 0.5);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.lives, state.tuning.start_lives - 1);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].vel, Vec2::ZERO);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LifeLost { lives: 2 }));
    }

    #[test]
    fn test_last_ball_lost_ends_game_and_freezes() {
        let mut state = active_state();
        state.lives = 1;
        state.score = 250;
        state.balls[0].pos = Vec2::new(5.0, 29.9);
        state.balls[0].vel = Vec2::new(0.0, 0.5);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.high_score, 250);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver { final_score: 250 }));

        let frozen = RenderSnapshot::project(&state);
        for _ in 0..30 {
            tick(&mut state, &launch());
        }
        assert_eq!(RenderSnapshot::project(&state), frozen);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = active_state();
        state.lives = 1;
        state.score = 90;
        state.balls.clear();
        state.balls.push(crate::sim::state::Ball::new(
            Vec2::new(5.0, 29.9),
            Vec2::new(0.0, 0.5),
            0.5,
        ));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart);

        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 90);
        assert_eq!(state.lives, state.tuning.start_lives);
        assert_eq!(state.level(), 1);
        assert!(state.powerups.is_empty() && state.popups.is_empty());
    }

    #[test]
    fn test_streak_resets_per_ball() {
        let mut state = active_state();
        let paddle_y = state.paddle.y;
        state.balls.clear();
        let mut on_paddle = crate::sim::state::Ball::new(
            Vec2::new(30.0, paddle_y - 0.6),
            Vec2::new(0.0, 0.5),
            0.5,
        );
        on_paddle.streak = 3;
        let mut in_flight =
            crate::sim::state::Ball::new(Vec2::new(10.0, 15.0), Vec2::new(0.2, -0.3), 0.5);
        in_flight.streak = 2;
        state.balls.push(on_paddle);
        state.balls.push(in_flight);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.balls[0].streak, 0);
        assert_eq!(state.balls[1].streak, 2);
    }

    #[test]
    fn test_level_advances_when_cleared() {
        let mut state = state_with(&[&["#"], &["##"]], quiet_tuning());
        state.launch();
        // Brick (0, 0) spans x 0.1..5.9, y 3..4
        state.balls[0].pos = Vec2::new(3.0, 4.8);
        state.balls[0].vel = Vec2::new(0.0, -1.0);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.level(), 2);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.grid.visible_count(), 2);
        assert_eq!(state.score, 10);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.paddle.width, state.paddle.base_width);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged { score: 10 }));
        assert!(events.contains(&GameEvent::LevelLoaded { level: 2 }));
    }

    #[test]
    fn test_final_level_wraps_keeping_score() {
        let mut state = state_with(&[&["#"]], quiet_tuning());
        state.launch();
        state.balls[0].pos = Vec2::new(3.0, 4.8);
        state.balls[0].vel = Vec2::new(0.0, -1.0);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.level(), 1);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 10);
        assert_eq!(state.grid.visible_count(), 1);
    }

    #[test]
    fn test_final_level_can_end_game() {
        let tuning = Tuning {
            final_level_policy: FinalLevelPolicy::EndGame,
            ..quiet_tuning()
        };
        let mut state = state_with(&[&["#"]], tuning);
        state.launch();
        state.balls[0].pos = Vec2::new(3.0, 4.8);
        state.balls[0].vel = Vec2::new(0.0, -1.0);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver { final_score: 10 }));
    }

    #[test]
    fn test_multiball_pickup_through_tick() {
        let mut state = active_state();
        state.balls[0].pos = Vec2::new(10.0, 15.0);
        state.balls[0].vel = Vec2::new(0.2, -0.3);
        let at = Vec2::new(state.paddle.center_x(), state.paddle.y - 0.5);
        powerup::spawn(&mut state, PowerUpKind::MultiBall, at);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.balls.len(), 3);
        assert!(state.powerups.is_empty());
        assert_eq!(state.balls[1].vel.x, -state.balls[2].vel.x);
        assert_eq!(state.balls[1].vel.y, state.balls[2].vel.y);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical snapshots
        let mut state1 = GameState::new(area(), Tuning::default(), 99999).unwrap();
        let mut state2 = GameState::new(area(), Tuning::default(), 99999).unwrap();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..3000 {
            tick(&mut state1, &input);
            tick(&mut state2, &input);
            assert_eq!(
                RenderSnapshot::project(&state1),
                RenderSnapshot::project(&state2)
            );
        }
        assert_eq!(state1.drain_events(), state2.drain_events());
    }

    #[test]
    fn test_autopilot_makes_progress() {
        let mut state = GameState::new(area(), Tuning::default(), 4242).unwrap();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..5000 {
            tick(&mut state, &input);
        }

        assert!(state.score > 0);
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), prop::bool::weighted(0.05), prop::bool::weighted(0.02))
            .prop_map(|(left, right, launch, pause)| TickInput {
                left,
                right,
                launch,
                pause,
                restart: true,
                idle_mode: false,
            })
    }

    proptest! {
        /// Paddle stays inside the play area and bricks stay inside the grid
        #[test]
        fn prop_paddle_and_bricks_stay_in_bounds(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..400),
        ) {
            let mut state = GameState::new(area(), Tuning::default(), seed).unwrap();

            for input in &inputs {
                tick(&mut state, input);

                let paddle = &state.paddle;
                prop_assert!(paddle.x >= state.area.left);
                prop_assert!(paddle.x <= state.area.right() - paddle.width + 1e-4);
                prop_assert!(paddle.width >= paddle.base_width);

                let layout = state.grid.layout;
                for brick in state.grid.visible_bricks() {
                    prop_assert!(brick.col < layout.cols);
                    prop_assert!(brick.row < layout.rows);
                }
            }
        }

        /// Same seed and inputs give the same snapshot
        #[test]
        fn prop_same_inputs_same_snapshot(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..200),
        ) {
            let mut a = GameState::new(area(), Tuning::default(), seed).unwrap();
            let mut b = GameState::new(area(), Tuning::default(), seed).unwrap();

            for input in &inputs {
                tick(&mut a, input);
                tick(&mut b, input);
            }
            prop_assert_eq!(RenderSnapshot::project(&a), RenderSnapshot::project(&b));
        }
    }
}
