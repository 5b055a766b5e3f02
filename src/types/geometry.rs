//! Integer pixel geometry used by layout, hit testing and rendering.

use serde::{Deserialize, Serialize};

/// A point in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared distance, enough for drag thresholds without floats.
    pub fn distance_squared(self, other: IntPoint) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

/// A size in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(top_left: IntPoint, size: IntSize) -> Self {
        Self {
            left: top_left.x,
            top: top_left.y,
            width: size.width,
            height: size.height,
        }
    }

    pub const fn from_xywh(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    pub fn top_left(&self) -> IntPoint {
        IntPoint::new(self.left, self.top)
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, pt: IntPoint) -> bool {
        pt.x >= self.left && pt.x < self.right() && pt.y >= self.top && pt.y < self.bottom()
    }

    /// Grow (or shrink, with negative deltas) by `dx` on both horizontal
    /// sides and `dy` on both vertical sides.
    pub fn grow_symmetrical(&self, dx: i32, dy: i32) -> IntRect {
        IntRect {
            left: self.left - dx,
            top: self.top - dy,
            width: (self.width + 2 * dx).max(0),
            height: (self.height + 2 * dy).max(0),
        }
    }

    /// Overlap of two rectangles, `None` when they do not touch.
    pub fn intersect(&self, other: &IntRect) -> Option<IntRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(IntRect::from_xywh(left, top, right - left, bottom - top))
    }

    /// Vertical middle, used for strike-out decorations.
    pub fn center_y(&self) -> i32 {
        self.top + self.height / 2
    }
}
