//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults come from
//! [`crate::consts`]; a JSON document can override any subset of fields.
//! [`RuleSet`] presets capture the constants that diverged between the
//! terminal build and the older desktop build.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Named rule-set presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RuleSet {
    /// Authoritative rules
    #[default]
    Terminal,
    /// Older desktop rules: short extend timer, constant-speed bounce, game ends after last level
    DesktopLegacy,
}

impl RuleSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSet::Terminal => "terminal",
            RuleSet::DesktopLegacy => "desktop-legacy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" | "term" => Some(RuleSet::Terminal),
            "desktop-legacy" | "desktop" | "legacy" => Some(RuleSet::DesktopLegacy),
            _ => None,
        }
    }
}

/// How vertical speed is chosen after a paddle bounce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BounceModel {
    /// Keep the vertical speed magnitude, only flip its sign
    #[default]
    Classic,
    /// Derive vertical speed so total speed is unchanged by the reshaped horizontal speed
    ConstantSpeed,
}

/// What happens when the last layout is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FinalLevelPolicy {
    /// Start over at level 1, keeping score and lives
    #[default]
    Wrap,
    /// The run ends
    EndGame,
}

/// Runtime-tunable gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Host tick rate, used only to report elapsed seconds
    pub tick_rate: f32,

    // === Session ===
    pub start_lives: u8,
    pub max_balls: usize,

    // === Ball ===
    pub ball_radius: f32,
    pub launch_speed: f32,
    /// Integer horizontal steps with a fractional carry
    pub quantize_horizontal: bool,

    // === Paddle ===
    pub paddle_base_width: f32,
    pub paddle_extended_width: f32,
    pub paddle_height: f32,
    /// Distance from the play area bottom to the paddle top
    pub paddle_bottom_offset: f32,
    /// Paddle travel per tick while a direction is held
    pub paddle_speed: f32,

    // === Bounce shaping ===
    pub bounce_model: BounceModel,
    pub bounce_exponent: f32,
    pub max_bounce_vx: f32,
    pub min_bounce_vx: f32,

    // === Brick grid ===
    pub grid_cols: usize,
    pub grid_rows: usize,
    /// Distance from the play area top to the first brick row
    pub grid_top_offset: f32,
    pub brick_height: f32,
    /// Horizontal gap between neighbouring bricks
    pub brick_gap: f32,

    // === Levels ===
    pub generated_levels: usize,
    pub generated_base_count: usize,
    pub generated_count_step: usize,
    pub final_level_policy: FinalLevelPolicy,

    // === Scoring ===
    pub points_per_brick: u64,
    pub popup_lifetime_ticks: u32,
    pub popup_rise: f32,

    // === Power-ups ===
    pub powerup_chance: f64,
    pub powerup_width: f32,
    pub powerup_height: f32,
    pub powerup_fall_step: f32,
    pub powerup_fall_interval: u32,
    pub catch_margin: f32,
    pub multiball_spread: f32,
    pub extend_duration_ticks: u32,
    pub blink_window_ticks: u32,
    pub blink_interval_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,

            start_lives: START_LIVES,
            max_balls: MAX_BALLS,

            ball_radius: BALL_RADIUS,
            launch_speed: LAUNCH_SPEED,
            quantize_horizontal: false,

            paddle_base_width: PADDLE_BASE_WIDTH,
            paddle_extended_width: PADDLE_EXTENDED_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_bottom_offset: PADDLE_BOTTOM_OFFSET,
            paddle_speed: PADDLE_SPEED,

            bounce_model: BounceModel::Classic,
            bounce_exponent: BOUNCE_EXPONENT,
            max_bounce_vx: MAX_BOUNCE_VX,
            min_bounce_vx: MIN_BOUNCE_VX,

            grid_cols: GRID_COLS,
            grid_rows: GRID_ROWS,
            grid_top_offset: GRID_TOP_OFFSET,
            brick_height: BRICK_HEIGHT,
            brick_gap: BRICK_GAP,

            generated_levels: 3,
            generated_base_count: 24,
            generated_count_step: 8,
            final_level_policy: FinalLevelPolicy::Wrap,

            points_per_brick: POINTS_PER_BRICK,
            popup_lifetime_ticks: POPUP_LIFETIME_TICKS,
            popup_rise: POPUP_RISE,

            powerup_chance: POWERUP_CHANCE,
            powerup_width: POWERUP_WIDTH,
            powerup_height: POWERUP_HEIGHT,
            powerup_fall_step: POWERUP_FALL_STEP,
            powerup_fall_interval: POWERUP_FALL_INTERVAL,
            catch_margin: CATCH_MARGIN,
            multiball_spread: MULTIBALL_SPREAD,
            extend_duration_ticks: EXTEND_DURATION_TICKS,
            blink_window_ticks: BLINK_WINDOW_TICKS,
            blink_interval_ticks: BLINK_INTERVAL_TICKS,
        }
    }
}

impl Tuning {
    /// Create tuning from a rule-set preset
    pub fn from_preset(preset: RuleSet) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Overwrite the constants that differ between rule sets
    pub fn apply_preset(&mut self, preset: RuleSet) {
        match preset {
            RuleSet::Terminal => {
                let defaults = Self::default();
                self.extend_duration_ticks = defaults.extend_duration_ticks;
                self.bounce_model = defaults.bounce_model;
                self.min_bounce_vx = defaults.min_bounce_vx;
                self.final_level_policy = defaults.final_level_policy;
            }
            RuleSet::DesktopLegacy => {
                self.extend_duration_ticks = LEGACY_EXTEND_DURATION_TICKS;
                self.bounce_model = BounceModel::ConstantSpeed;
                self.min_bounce_vx = LEGACY_MIN_BOUNCE_VX;
                self.final_level_policy = FinalLevelPolicy::EndGame;
            }
        }
    }

    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> SimResult<()> {
        positive("tick_rate", self.tick_rate)?;
        positive("ball_radius", self.ball_radius)?;
        positive("launch_speed", self.launch_speed)?;
        positive("paddle_base_width", self.paddle_base_width)?;
        positive("paddle_height", self.paddle_height)?;
        positive("paddle_speed", self.paddle_speed)?;
        positive("bounce_exponent", self.bounce_exponent)?;
        positive("max_bounce_vx", self.max_bounce_vx)?;
        positive("brick_height", self.brick_height)?;
        positive("powerup_width", self.powerup_width)?;
        positive("powerup_height", self.powerup_height)?;
        positive("powerup_fall_step", self.powerup_fall_step)?;
        non_negative("paddle_bottom_offset", self.paddle_bottom_offset)?;
        non_negative("grid_top_offset", self.grid_top_offset)?;
        non_negative("brick_gap", self.brick_gap)?;
        non_negative("min_bounce_vx", self.min_bounce_vx)?;
        non_negative("catch_margin", self.catch_margin)?;
        non_negative("multiball_spread", self.multiball_spread)?;
        non_negative("popup_rise", self.popup_rise)?;

        if self.paddle_extended_width < self.paddle_base_width {
            return Err(SimError::InvalidTuning {
                name: "paddle_extended_width",
                value: self.paddle_extended_width as f64,
                expected: "[paddle_base_width, inf)",
            });
        }
        if self.min_bounce_vx > self.max_bounce_vx {
            return Err(SimError::InvalidTuning {
                name: "min_bounce_vx",
                value: self.min_bounce_vx as f64,
                expected: "[0, max_bounce_vx]",
            });
        }
        if !(0.0..=1.0).contains(&self.powerup_chance) {
            return Err(SimError::InvalidTuning {
                name: "powerup_chance",
                value: self.powerup_chance,
                expected: "[0, 1]",
            });
        }
        at_least_one("start_lives", self.start_lives as u64)?;
        at_least_one("max_balls", self.max_balls as u64)?;
        at_least_one("grid_cols", self.grid_cols as u64)?;
        at_least_one("grid_rows", self.grid_rows as u64)?;
        at_least_one("generated_base_count", self.generated_base_count as u64)?;
        at_least_one("powerup_fall_interval", self.powerup_fall_interval as u64)?;
        at_least_one("popup_lifetime_ticks", self.popup_lifetime_ticks as u64)?;
        at_least_one("blink_interval_ticks", self.blink_interval_ticks as u64)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTuning {
            name,
            value: value as f64,
            expected: "(0, inf)",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTuning {
            name,
            value: value as f64,
            expected: "[0, inf)",
        })
    }
}

fn at_least_one(name: &'static str, value: u64) -> SimResult<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(SimError::InvalidTuning {
            name,
            value: value as f64,
            expected: "[1, inf)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
        assert!(Tuning::from_preset(RuleSet::DesktopLegacy).validate().is_ok());
    }

    #[test]
    fn test_presets_differ_on_legacy_constants() {
        let terminal = Tuning::from_preset(RuleSet::Terminal);
        let legacy = Tuning::from_preset(RuleSet::DesktopLegacy);

        assert_eq!(terminal.extend_duration_ticks, 600);
        assert_eq!(legacy.extend_duration_ticks, 300);
        assert_eq!(legacy.bounce_model, BounceModel::ConstantSpeed);
        assert_eq!(legacy.final_level_policy, FinalLevelPolicy::EndGame);

        // Switching back restores the authoritative values
        let mut tuning = legacy.clone();
        tuning.apply_preset(RuleSet::Terminal);
        assert_eq!(tuning, terminal);
    }

    #[test]
    fn test_rule_set_names() {
        assert_eq!(RuleSet::from_str("Terminal"), Some(RuleSet::Terminal));
        assert_eq!(RuleSet::from_str("legacy"), Some(RuleSet::DesktopLegacy));
        assert_eq!(RuleSet::from_str("arcade"), None);
        assert_eq!(
            RuleSet::from_str(RuleSet::DesktopLegacy.as_str()),
            Some(RuleSet::DesktopLegacy)
        );
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "start_lives": 5, "powerup_chance": 0.5 }"#).unwrap();
        assert_eq!(tuning.start_lives, 5);
        assert_eq!(tuning.powerup_chance, 0.5);
        assert_eq!(tuning.grid_cols, GRID_COLS);
    }

    #[test]
    fn test_generated_levels_need_bricks() {
        let err = Tuning::from_json(r#"{ "generated_base_count": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidTuning {
                name: "generated_base_count",
                ..
            }
        ));
    }

    #[test]
    fn test_json_rejects_out_of_range() {
        let err = Tuning::from_json(r#"{ "powerup_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidTuning {
                name: "powerup_chance",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "paddle_extended_width": 3.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning { .. }));

        assert!(matches!(
            Tuning::from_json("not json"),
            Err(SimError::TuningParse(_))
        ));
    }
}
