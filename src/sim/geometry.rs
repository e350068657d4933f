//! Axis-aligned geometry for the play field
//!
//! Screen-style coordinates: x grows right, y grows down. A rectangle is
//! anchored at its top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Overlap test; touching edges count as overlapping
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }

    /// Whether `x` lies within the horizontal span (edges included)
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right()
    }

    /// Copy grown by `margin` on the left and right edges
    pub fn widened(&self, margin: f32) -> Self {
        Self {
            left: self.left - margin,
            width: self.width + margin * 2.0,
            ..*self
        }
    }

    /// Reject zero, negative or non-finite dimensions
    pub fn validate(&self) -> SimResult<()> {
        let finite = self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::InvalidPlayArea {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Circle vs rectangle overlap via the closest point on the rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.left, rect.right()),
        center.y.clamp(rect.top, rect.bottom()),
    );
    center.distance_squared(closest) <= radius * radius
}
