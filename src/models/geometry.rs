//! Scene-space geometry primitives.

use serde::{Deserialize, Serialize};

/// A point in scene (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left corner and extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given extent centered on the origin.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        Self::new(width / -2.0, height / -2.0, width, height)
    }

    /// Returns this rectangle moved by `offset`.
    #[must_use]
    pub fn translated(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Dimensions of the playfield scene in pixels.
///
/// The scene is the playfield image; normalized coordinates are fractions
/// of these dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSize {
    /// Scene width in pixels
    pub width: f64,
    /// Scene height in pixels
    pub height: f64,
}

impl SceneSize {
    /// Creates a new scene size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Converts a pixel position to normalized coordinates.
    ///
    /// An axis with a non-positive extent passes the pixel value through
    /// unchanged instead of dividing by zero.
    #[must_use]
    pub fn normalize(&self, pos: Point) -> Point {
        let x = if self.width > 0.0 {
            pos.x / self.width
        } else {
            pos.x
        };
        let y = if self.height > 0.0 {
            pos.y / self.height
        } else {
            pos.y
        };
        Point::new(x, y)
    }

    /// Converts normalized coordinates back to pixels.
    #[must_use]
    pub fn denormalize(&self, pos: Point) -> Point {
        Point::new(pos.x * self.width, pos.y * self.height)
    }

    /// Strict interior test used while dragging: points on or beyond the
    /// edge are off the playfield.
    #[must_use]
    pub fn strictly_contains(&self, pos: Point) -> bool {
        self.width > pos.x && pos.x > 0.0 && self.height > pos.y && pos.y > 0.0
    }
}
