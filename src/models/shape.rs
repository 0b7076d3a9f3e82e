//! Widget shape selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outline drawn for a placed device widget.
///
/// `Default` means "whatever suits the device type": lights draw as circles,
/// switches as squares. It is never written to the layout file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Shape {
    /// Device-type dependent outline
    #[default]
    Default,
    /// Axis-aligned square
    Square,
    /// Tall rectangle (40% of the device size wide)
    Rectangle,
    /// Disk
    Circle,
    /// Isosceles triangle
    Triangle,
    /// Seven point arrow pointing up
    Arrow,
    /// Long isosceles triangle
    Flipper,
}

impl Shape {
    /// All shapes, in their persisted ordinal order.
    pub const ALL: [Self; 7] = [
        Self::Default,
        Self::Square,
        Self::Rectangle,
        Self::Circle,
        Self::Triangle,
        Self::Arrow,
        Self::Flipper,
    ];

    /// Parses a shape name, case-insensitively.
    ///
    /// Anything that is not a shape name resolves to [`Shape::Default`]; a bad
    /// value in a layout file should never keep a device off the playfield.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpf_playfield::models::Shape;
    ///
    /// assert_eq!(Shape::parse("arrow"), Shape::Arrow);
    /// assert_eq!(Shape::parse(" FLIPPER "), Shape::Flipper);
    /// assert_eq!(Shape::parse("Not_A_Shape"), Shape::Default);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(value))
            .unwrap_or_default()
    }

    /// Upper-case name used in the layout file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Square => "SQUARE",
            Self::Rectangle => "RECTANGLE",
            Self::Circle => "CIRCLE",
            Self::Triangle => "TRIANGLE",
            Self::Arrow => "ARROW",
            Self::Flipper => "FLIPPER",
        }
    }

    /// Returns true for [`Shape::Default`].
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Shape {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
