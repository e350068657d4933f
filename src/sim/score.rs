//! Streak scoring and score popups
//!
//! Streaks are per ball: a brick hit extends the hitting ball's streak and
//! scores `points_per_brick × streak`; a paddle touch resets that ball only.

use glam::Vec2;

use super::collision::BrickHit;
use super::state::{Ball, GameEvent, GameState, ScorePopup};

/// Vertical distance between the points popup and the multiplier popup
const MULTIPLIER_POPUP_OFFSET: f32 = 1.0;

/// Extend the ball's streak; returns (points, multiplier)
pub fn register_hit(ball: &mut Ball, points_per_brick: u64) -> (u64, u32) {
    ball.streak = ball.streak.saturating_add(1);
    (points_per_brick * ball.streak as u64, ball.streak)
}

pub fn reset_streak(ball: &mut Ball) {
    ball.streak = 0;
}

/// Add a hit's points to the session and queue its popups
pub fn award(state: &mut GameState, hit: &BrickHit) {
    state.score += hit.points;
    state.events.push(GameEvent::ScoreChanged { score: state.score });

    let lifetime = state.tuning.popup_lifetime_ticks;
    state.popups.push(ScorePopup {
        pos: hit.center,
        text: format!("+{}", hit.points),
        multiplier: false,
        age: 0,
        lifetime,
    });
    if hit.multiplier > 1 {
        state.popups.push(ScorePopup {
            pos: hit.center - Vec2::new(0.0, MULTIPLIER_POPUP_OFFSET),
            text: format!("x{}", hit.multiplier),
            multiplier: true,
            age: 0,
            lifetime,
        });
    }
}

/// Rise, age and prune popups
pub fn advance_popups(popups: &mut Vec<ScorePopup>, rise: f32) {
    for popup in popups.iter_mut() {
        popup.age += 1;
        popup.pos.y -= rise;
    }
    popups.retain(|p| !p.expired());
}

/// Raise the session high score if the current score beats it
pub fn record_high_score(state: &mut GameState) -> bool {
    if state.score > state.high_score {
        log::info!("New high score: {}", state.score);
        state.high_score = state.score;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Rect;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        let mut state =
            GameState::new(Rect::new(0.0, 0.0, 60.0, 30.0), Tuning::default(), 5).unwrap();
        state.drain_events();
        state
    }

    fn hit(points: u64, multiplier: u32) -> BrickHit {
        BrickHit {
            col: 0,
            row: 0,
            points,
            multiplier,
            center: Vec2::new(3.0, 3.5),
        }
    }

    #[test]
    fn test_streak_scales_points() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::ZERO, 0.5);

        assert_eq!(register_hit(&mut ball, 10), (10, 1));
        assert_eq!(register_hit(&mut ball, 10), (20, 2));
        assert_eq!(register_hit(&mut ball, 10), (30, 3));

        reset_streak(&mut ball);
        assert_eq!(register_hit(&mut ball, 10), (10, 1));
    }

    #[test]
    fn test_award_single_popup_without_multiplier() {
        let mut state = state();

        award(&mut state, &hit(10, 1));

        assert_eq!(state.score, 10);
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].text, "+10");
        assert!(!state.popups[0].multiplier);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ScoreChanged { score: 10 }]
        );
    }

    #[test]
    fn test_award_adds_multiplier_popup() {
        let mut state = state();

        award(&mut state, &hit(30, 3));

        assert_eq!(state.popups.len(), 2);
        assert_eq!(state.popups[1].text, "x3");
        assert!(state.popups[1].multiplier);
        assert!(state.popups[1].pos.y < state.popups[0].pos.y);
    }

    #[test]
    fn test_popups_rise_fade_and_expire() {
        let mut popups = vec![ScorePopup {
            pos: Vec2::new(0.0, 10.0),
            text: "+10".to_string(),
            multiplier: false,
            age: 0,
            lifetime: 4,
        }];

        advance_popups(&mut popups, 0.5);
        assert_eq!(popups[0].pos.y, 9.5);
        assert_eq!(popups[0].opacity(), 0.75);

        for _ in 0..3 {
            advance_popups(&mut popups, 0.5);
        }
        assert!(popups.is_empty());
    }

    #[test]
    fn test_high_score_only_when_exceeded() {
        let mut state = state();
        state.high_score = 100;

        state.score = 80;
        assert!(!record_high_score(&mut state));
        assert_eq!(state.high_score, 100);

        state.score = 120;
        assert!(record_high_score(&mut state));
        assert_eq!(state.high_score, 120);
    }
}
