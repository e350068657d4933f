//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]. Entities are
//! plain records stored in `Vec`s whose insertion order is the iteration
//! order, which keeps ticks deterministic.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::level::{BrickGrid, GridLayout, LevelDirector};
use crate::error::{SimError, SimResult};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball parked on the paddle, waiting for launch input
    Ready,
    /// Physics runs
    Active,
    /// Nothing mutates until unpaused
    Paused,
    /// Swapping layouts; never observed between ticks
    LevelTransition,
    /// Run ended, waiting for restart
    GameOver,
}

/// Domain events for hosts (score submission, UI transitions, cues)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameOver { final_score: u64 },
    /// 1-based level number
    LevelLoaded { level: u32 },
    ScoreChanged { score: u64 },
    LifeLost { lives: u8 },
    PowerUpCollected { kind: PowerUpKind },
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Consecutive bricks hit since this ball last touched the paddle
    pub streak: u32,
    /// Fractional horizontal motion not yet applied (quantized motion only)
    pub carry: f32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            streak: 0,
            carry: 0.0,
        }
    }

    /// A motionless ball resting on top of the paddle center
    pub fn parked(paddle: &Paddle, radius: f32) -> Self {
        let mut ball = Self::new(Vec2::ZERO, Vec2::ZERO, radius);
        ball.park_on(paddle);
        ball
    }

    /// Follow the paddle while waiting for launch
    pub fn park_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.radius);
    }

    /// Horizontal displacement for this tick
    ///
    /// Quantized motion moves by whole units: the integer part of `vel.x`
    /// plus one extra unit whenever the carried fraction crosses ±1.
    pub fn horizontal_step(&mut self, quantize: bool) -> f32 {
        if !quantize {
            return self.vel.x;
        }
        let whole = self.vel.x.trunc();
        self.carry += self.vel.x - whole;
        let extra = if self.carry >= 1.0 {
            self.carry -= 1.0;
            1.0
        } else if self.carry <= -1.0 {
            self.carry += 1.0;
            -1.0
        } else {
            0.0
        };
        whole + extra
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge (fixed row)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub base_width: f32,
}

impl Paddle {
    /// Paddle centered horizontally on its row
    pub fn centered(area: &Rect, tuning: &Tuning) -> Self {
        let width = tuning.paddle_base_width;
        Self {
            x: area.left + (area.width - width) / 2.0,
            y: area.bottom() - tuning.paddle_bottom_offset,
            width,
            height: tuning.paddle_height,
            base_width: width,
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Keep the paddle inside `[area.left, area.right - width]`
    pub fn clamp_to(&mut self, area: &Rect) {
        let max_x = (area.right() - self.width).max(area.left);
        self.x = self.x.clamp(area.left, max_x);
    }

    pub fn move_by(&mut self, dx: f32, area: &Rect) {
        self.x += dx;
        self.clamp_to(area);
    }

    /// Change width symmetrically around the current center, then clamp
    pub fn set_width_centered(&mut self, width: f32, area: &Rect) {
        let width = width.max(self.base_width);
        self.x -= (width - self.width) / 2.0;
        self.width = width;
        self.clamp_to(area);
    }
}

/// Brick colors (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickColor {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl BrickColor {
    pub const PALETTE: [BrickColor; 7] = [
        BrickColor::Red,
        BrickColor::Orange,
        BrickColor::Yellow,
        BrickColor::Green,
        BrickColor::Cyan,
        BrickColor::Blue,
        BrickColor::Magenta,
    ];

    /// Default color for a row
    pub fn for_row(row: usize) -> Self {
        Self::PALETTE[row % Self::PALETTE.len()]
    }

    /// Color from a pattern character (R, O, Y, G, C, B, M)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(BrickColor::Red),
            'O' => Some(BrickColor::Orange),
            'Y' => Some(BrickColor::Yellow),
            'G' => Some(BrickColor::Green),
            'C' => Some(BrickColor::Cyan),
            'B' => Some(BrickColor::Blue),
            'M' => Some(BrickColor::Magenta),
            _ => None,
        }
    }
}

/// A brick entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub col: usize,
    pub row: usize,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub visible: bool,
    pub color: BrickColor,
}

impl Brick {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    MultiBall,
    PaddleExtend,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::MultiBall, PowerUpKind::PaddleExtend];
}

/// A falling power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PowerUpKind,
    pub fall_step: f32,
    /// Ticks since the last fall step
    pub fall_timer: u32,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Floating score text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub text: String,
    /// Carries a multiplier ("x3") rather than points
    pub multiplier: bool,
    pub age: u32,
    pub lifetime: u32,
}

impl ScorePopup {
    /// Linear fade from 1 to 0 over the lifetime
    pub fn opacity(&self) -> f32 {
        if self.lifetime == 0 {
            return 0.0;
        }
        1.0 - (self.age.min(self.lifetime) as f32 / self.lifetime as f32)
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Ticks left on the paddle extension
    pub extend_ticks: u32,
    /// Paddle should flash: extension about to expire
    pub blink: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The only randomness source the simulation uses
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Play area (physics bounds)
    pub area: Rect,
    pub phase: GamePhase,
    /// Phase to restore when unpausing
    pub(crate) resume_phase: GamePhase,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub grid: BrickGrid,
    pub levels: LevelDirector,
    pub powerups: Vec<PowerUp>,
    pub popups: Vec<ScorePopup>,
    pub effects: ActiveEffects,
    pub score: u64,
    /// Best score seen this session
    pub high_score: u64,
    pub lives: u8,
    /// Ticks spent in Ready or Active
    pub elapsed_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with the standard level set
    pub fn new(area: Rect, tuning: Tuning, seed: u64) -> SimResult<Self> {
        tuning.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let levels = LevelDirector::standard(&tuning, &mut rng)?;
        Self::build(area, tuning, seed, rng, levels)
    }

    /// Create a new game with a custom level director
    pub fn with_levels(
        area: Rect,
        tuning: Tuning,
        seed: u64,
        levels: LevelDirector,
    ) -> SimResult<Self> {
        tuning.validate()?;
        let rng = Pcg32::seed_from_u64(seed);
        Self::build(area, tuning, seed, rng, levels)
    }

    fn build(
        area: Rect,
        tuning: Tuning,
        seed: u64,
        rng: Pcg32,
        mut levels: LevelDirector,
    ) -> SimResult<Self> {
        check_area(&area, &tuning)?;
        let grid_dims = (tuning.grid_cols, tuning.grid_rows);
        if levels.dimensions() != grid_dims {
            return Err(SimError::GridMismatch {
                levels: levels.dimensions(),
                grid: grid_dims,
            });
        }
        levels.reset();
        let grid = levels.load(levels.current_index(), &GridLayout::for_area(&area, &tuning));
        let paddle = Paddle::centered(&area, &tuning);

        let mut state = Self {
            seed,
            rng,
            lives: tuning.start_lives,
            tuning,
            area,
            phase: GamePhase::Ready,
            resume_phase: GamePhase::Ready,
            paddle,
            balls: Vec::new(),
            grid,
            levels,
            powerups: Vec::new(),
            popups: Vec::new(),
            effects: ActiveEffects::default(),
            score: 0,
            high_score: 0,
            elapsed_ticks: 0,
            events: Vec::new(),
        };
        state.spawn_parked_ball();
        state.events.push(GameEvent::LevelLoaded { level: 1 });
        log::info!("Game initialized with seed: {}", seed);
        Ok(state)
    }

    /// Current level, 1-based
    pub fn level(&self) -> u32 {
        self.levels.current_index() as u32 + 1
    }

    /// Park a fresh ball on the paddle
    pub fn spawn_parked_ball(&mut self) {
        let ball = Ball::parked(&self.paddle, self.tuning.ball_radius);
        self.balls.push(ball);
    }

    /// Events raised since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Toggle between the current phase and Paused
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Paused => {
                self.phase = self.resume_phase;
            }
            phase => {
                self.resume_phase = phase;
                self.phase = GamePhase::Paused;
            }
        }
    }

    /// Launch the parked ball straight up
    pub fn launch(&mut self) {
        if self.phase != GamePhase::Ready {
            return;
        }
        if let Some(ball) = self.balls.first_mut() {
            ball.vel = Vec2::new(0.0, -self.tuning.launch_speed);
        }
        self.phase = GamePhase::Active;
    }

    /// Load the director's current layout and reset the per-level state
    pub(crate) fn load_current_level(&mut self) {
        let layout = GridLayout::for_area(&self.area, &self.tuning);
        self.grid = self.levels.load(self.levels.current_index(), &layout);

        self.paddle.set_width_centered(self.paddle.base_width, &self.area);
        self.effects = ActiveEffects::default();
        self.powerups.clear();
        self.popups.clear();
        self.balls.clear();
        self.spawn_parked_ball();
        self.phase = GamePhase::Ready;

        let level = self.level();
        log::info!(
            "Level {} loaded: {} bricks",
            level,
            self.grid.visible_count()
        );
        self.events.push(GameEvent::LevelLoaded { level });
    }

    /// Full reset back to level 1; the session high score survives
    pub fn restart(&mut self) {
        self.score = 0;
        self.lives = self.tuning.start_lives;
        self.elapsed_ticks = 0;
        self.levels.reset();
        self.paddle = Paddle::centered(&self.area, &self.tuning);
        self.load_current_level();
        self.events.push(GameEvent::ScoreChanged { score: 0 });
        log::info!("Game restarted");
    }

    /// Move or resize the play area
    ///
    /// A pure move translates every entity by the origin delta. A size change
    /// maps entities proportionally onto the new area, re-places the bricks on
    /// a grid fitted to it and puts the paddle back on its row.
    pub fn resize(&mut self, area: Rect) -> SimResult<()> {
        check_area(&area, &self.tuning)?;
        let old = self.area;

        if area.width == old.width && area.height == old.height {
            let delta = area.origin() - old.origin();
            self.paddle.x += delta.x;
            self.paddle.y += delta.y;
            for ball in &mut self.balls {
                ball.pos += delta;
            }
            for powerup in &mut self.powerups {
                powerup.pos += delta;
            }
            for popup in &mut self.popups {
                popup.pos += delta;
            }
            self.grid.translate(delta);
            log::debug!("World shifted by ({}, {})", delta.x, delta.y);
        } else {
            let scale = Vec2::new(area.width / old.width, area.height / old.height);
            let remap = |p: Vec2| area.origin() + (p - old.origin()) * scale;

            let center = remap(Vec2::new(self.paddle.center_x(), self.paddle.y));
            self.paddle.x = center.x - self.paddle.width / 2.0;
            self.paddle.y = area.bottom() - self.tuning.paddle_bottom_offset;
            for ball in &mut self.balls {
                ball.pos = remap(ball.pos);
            }
            for powerup in &mut self.powerups {
                powerup.pos = remap(powerup.pos);
            }
            for popup in &mut self.popups {
                popup.pos = remap(popup.pos);
            }
            self.grid.relayout(GridLayout::for_area(&area, &self.tuning));
            log::debug!(
                "World resized from {}x{} to {}x{}",
                old.width,
                old.height,
                area.width,
                area.height
            );
        }

        self.area = area;
        self.paddle.clamp_to(&self.area);
        if self.is_ready() {
            for ball in &mut self.balls {
                ball.park_on(&self.paddle);
            }
        }
        Ok(())
    }

    /// Ball(s) parked on the paddle, waiting for launch
    pub fn is_ready(&self) -> bool {
        self.phase == GamePhase::Ready
            || (self.phase == GamePhase::Paused && self.resume_phase == GamePhase::Ready)
    }
}

fn check_area(area: &Rect, tuning: &Tuning) -> SimResult<()> {
    area.validate()?;
    // Room for the brick rows above the paddle row
    let grid_bottom = tuning.grid_top_offset + tuning.grid_rows as f32 * tuning.brick_height;
    if area.width < tuning.paddle_extended_width
        || area.height <= grid_bottom + tuning.paddle_bottom_offset
    {
        return Err(SimError::InvalidPlayArea {
            width: area.width,
            height: area.height,
        });
    }
    Ok(())
}
