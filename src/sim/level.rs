//! Brick layouts, the brick arena and level progression
//!
//! Templates are immutable; every load deep-copies one into a fresh
//! [`BrickGrid`], so reloading a level always yields the pristine layout.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, circle_rect_overlap};
use super::state::{Brick, BrickColor};
use crate::error::{SimError, SimResult};
use crate::tuning::Tuning;

/// Hand-authored layouts for the default 10-column grid
const AUTHORED_PATTERNS: &[&[&str]] = &[
    &["##########", "##########", "##########"],
    &[
        "....RR....",
        "...OOOO...",
        "..YYYYYY..",
        ".GGGGGGGG.",
        "CCCCCCCCCC",
    ],
    &[
        "#.#.#.#.#.",
        ".#.#.#.#.#",
        "#.#.#.#.#.",
        ".#.#.#.#.#",
        "#.#.#.#.#.",
        ".#.#.#.#.#",
    ],
];

/// Placement of the brick grid in world space
///
/// The same layout drives brick placement and ball-to-cell mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    /// Top-left corner of cell (0, 0)
    pub origin: Vec2,
    pub cell_size: Vec2,
    /// Horizontal gap between bricks
    pub gap: f32,
}

impl GridLayout {
    /// Grid spanning the full play width, starting below the ceiling
    pub fn for_area(area: &Rect, tuning: &Tuning) -> Self {
        let cols = tuning.grid_cols.max(1);
        let cell_width = area.width / cols as f32;
        Self {
            cols,
            rows: tuning.grid_rows.max(1),
            origin: Vec2::new(area.left, area.top + tuning.grid_top_offset),
            cell_size: Vec2::new(cell_width, tuning.brick_height),
            gap: tuning.brick_gap.min(cell_width / 2.0),
        }
    }

    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.origin.x + col as f32 * self.cell_size.x,
            self.origin.y + row as f32 * self.cell_size.y,
            self.cell_size.x,
            self.cell_size.y,
        )
    }

    /// Cell rect minus half the gap on each side
    pub fn brick_rect(&self, col: usize, row: usize) -> Rect {
        let cell = self.cell_rect(col, row);
        Rect::new(
            cell.left + self.gap / 2.0,
            cell.top,
            cell.width - self.gap,
            cell.height,
        )
    }

    /// Map a world position to a grid cell
    ///
    /// Columns clamp into range; rows outside the grid map to nothing.
    pub fn cell_at(&self, pos: Vec2) -> Option<(usize, usize)> {
        if !pos.is_finite() {
            return None;
        }
        let row = ((pos.y - self.origin.y) / self.cell_size.y).floor();
        if row < 0.0 || row >= self.rows as f32 {
            return None;
        }
        let col = ((pos.x - self.origin.x) / self.cell_size.x).floor();
        let max_col = (self.cols - 1) as f32;
        if col < 0.0 || col > max_col {
            log::trace!("Clamped column {} into [0, {}]", col, max_col);
        }
        Some((col.clamp(0.0, max_col) as usize, row as usize))
    }
}

/// Brick arena indexed by (col, row)
#[derive(Debug, Clone, PartialEq)]
pub struct BrickGrid {
    pub layout: GridLayout,
    /// Row-major; `None` for cells the layout leaves empty
    cells: Vec<Option<Brick>>,
}

impl BrickGrid {
    /// Deep-copy a template into a fresh arena
    pub fn from_template(template: &LevelTemplate, layout: &GridLayout) -> Self {
        let mut cells = vec![None; layout.cols * layout.rows];
        for placed in &template.bricks {
            if placed.col >= layout.cols || placed.row >= layout.rows {
                log::warn!(
                    "Skipping brick at ({}, {}) outside {}x{} grid",
                    placed.col,
                    placed.row,
                    layout.cols,
                    layout.rows
                );
                continue;
            }
            let rect = layout.brick_rect(placed.col, placed.row);
            cells[placed.row * layout.cols + placed.col] = Some(Brick {
                col: placed.col,
                row: placed.row,
                pos: rect.origin(),
                size: Vec2::new(rect.width, rect.height),
                visible: true,
                color: placed.color,
            });
        }
        Self {
            layout: *layout,
            cells,
        }
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.layout.cols && row < self.layout.rows).then(|| row * self.layout.cols + col)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Brick> {
        self.index(col, row).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Brick> {
        self.index(col, row).and_then(|i| self.cells[i].as_mut())
    }

    /// Visible brick the ball at `pos` touches, if any
    pub fn brick_at(&self, pos: Vec2, radius: f32) -> Option<(usize, usize)> {
        let (col, row) = self.layout.cell_at(pos)?;
        let brick = self.get(col, row)?;
        (brick.visible && circle_rect_overlap(pos, radius, &brick.rect())).then_some((col, row))
    }

    /// Hide a brick; returns false if it was already gone
    pub fn destroy(&mut self, col: usize, row: usize) -> bool {
        match self.get_mut(col, row) {
            Some(brick) if brick.visible => {
                brick.visible = false;
                true
            }
            _ => false,
        }
    }

    pub fn visible_bricks(&self) -> impl Iterator<Item = &Brick> {
        self.cells.iter().flatten().filter(|b| b.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_bricks().count()
    }

    pub fn all_cleared(&self) -> bool {
        self.visible_bricks().next().is_none()
    }

    /// Re-place every brick on `layout`, keeping visibility
    pub fn relayout(&mut self, layout: GridLayout) {
        for brick in self.cells.iter_mut().flatten() {
            let rect = layout.brick_rect(brick.col, brick.row);
            brick.pos = rect.origin();
            brick.size = Vec2::new(rect.width, rect.height);
        }
        self.layout = layout;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.layout.origin += delta;
        for brick in self.cells.iter_mut().flatten() {
            brick.pos += delta;
        }
    }
}

/// One brick in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBrick {
    pub col: usize,
    pub row: usize,
    pub color: BrickColor,
}

/// Immutable brick layout
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelTemplate {
    pub bricks: Vec<TemplateBrick>,
}

impl LevelTemplate {
    /// Parse an ASCII pattern: `.` or space is empty, `#` uses the row color,
    /// a color letter (R, O, Y, G, C, B, M) picks that color
    pub fn from_pattern(rows: &[&str]) -> Self {
        let mut bricks = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                let color = match c {
                    '.' | ' ' => continue,
                    '#' => BrickColor::for_row(row),
                    other => BrickColor::from_char(other).unwrap_or(BrickColor::for_row(row)),
                };
                bricks.push(TemplateBrick { col, row, color });
            }
        }
        Self { bricks }
    }

    /// Place `count` bricks in unique random cells
    pub fn generated<R: Rng + ?Sized>(rng: &mut R, cols: usize, rows: usize, count: usize) -> Self {
        let cells = cols * rows;
        let mut picked = rand::seq::index::sample(rng, cells, count.min(cells)).into_vec();
        picked.sort_unstable();
        let bricks = picked
            .into_iter()
            .map(|i| {
                let (col, row) = (i % cols, i / cols);
                TemplateBrick {
                    col,
                    row,
                    color: BrickColor::for_row(row),
                }
            })
            .collect();
        Self { bricks }
    }

    fn fits(&self, cols: usize, rows: usize) -> bool {
        self.bricks.iter().all(|b| b.col < cols && b.row < rows)
    }
}

/// Ordered layouts plus the current position in them
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDirector {
    cols: usize,
    rows: usize,
    templates: Vec<LevelTemplate>,
    current: usize,
}

impl LevelDirector {
    pub fn new(cols: usize, rows: usize, templates: Vec<LevelTemplate>) -> SimResult<Self> {
        if templates.is_empty() {
            return Err(SimError::NoLevels);
        }
        if let Some(level) = templates.iter().position(|t| !t.fits(cols, rows)) {
            return Err(SimError::PatternTooLarge { level, cols, rows });
        }
        if let Some(level) = templates.iter().position(|t| t.bricks.is_empty()) {
            return Err(SimError::EmptyLevel { level });
        }
        Ok(Self {
            cols,
            rows,
            templates,
            current: 0,
        })
    }

    /// Hand-authored layouts only
    pub fn from_patterns(cols: usize, rows: usize, patterns: &[&[&str]]) -> SimResult<Self> {
        let templates = patterns
            .iter()
            .map(|p| LevelTemplate::from_pattern(p))
            .collect();
        Self::new(cols, rows, templates)
    }

    /// Random layouts, one per entry of `counts`
    pub fn generated<R: Rng + ?Sized>(
        cols: usize,
        rows: usize,
        rng: &mut R,
        counts: &[usize],
    ) -> SimResult<Self> {
        let templates = counts
            .iter()
            .map(|&count| LevelTemplate::generated(rng, cols, rows, count))
            .collect();
        Self::new(cols, rows, templates)
    }

    /// Authored layouts that fit the grid, followed by generated ones of increasing density
    pub fn standard<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> SimResult<Self> {
        let (cols, rows) = (tuning.grid_cols, tuning.grid_rows);
        let mut templates: Vec<LevelTemplate> = AUTHORED_PATTERNS
            .iter()
            .map(|p| LevelTemplate::from_pattern(p))
            .filter(|t| t.fits(cols, rows))
            .collect();
        for i in 0..tuning.generated_levels {
            let count = tuning.generated_base_count + i * tuning.generated_count_step;
            templates.push(LevelTemplate::generated(rng, cols, rows, count));
        }
        log::debug!("Standard level set: {} layouts", templates.len());
        Self::new(cols, rows, templates)
    }

    /// Fresh arena for layout `index` (clamped to the last layout)
    pub fn load(&self, index: usize, layout: &GridLayout) -> BrickGrid {
        let index = index.min(self.templates.len() - 1);
        BrickGrid::from_template(&self.templates[index], layout)
    }

    pub fn all_cleared(&self, grid: &BrickGrid) -> bool {
        grid.all_cleared()
    }

    /// Move to the next layout; false when already on the last one
    pub fn advance(&mut self) -> bool {
        if self.current + 1 < self.templates.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn level_count(&self) -> usize {
        self.templates.len()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}
