//! RGB color handling for widget brushes.

// Allow small types passed by reference for API consistency
#![allow(clippy::trivially_copy_pass_by_ref)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{GAMMA, GAMMA_SCALE};

/// RGB color value with hex string representation.
///
/// Lights report their color as a `[r, g, b]` triple; the same triple is
/// used for brushes handed to the host's painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl RgbColor {
    /// Pure black, the brush of an inactive switch.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure green, the brush of an active switch.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// White, used for widget outlines.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a new `RgbColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses an `RgbColor` from a hex string.
    ///
    /// Supports formats: "#RRGGBB", "RRGGBB", "#rrggbb", "rrggbb"
    ///
    /// # Examples
    ///
    /// ```
    /// use mpf_playfield::models::RgbColor;
    ///
    /// let color = RgbColor::from_hex("#FF0000").unwrap();
    /// assert_eq!(color, RgbColor::new(255, 0, 0));
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if !hex.is_ascii() || hex.len() != 6 {
            anyhow::bail!("Invalid hex color format '{hex}'. Expected 6 hex digits (RRGGBB)");
        }

        let r = u8::from_str_radix(&hex[0..2], 16)
            .context(format!("Invalid red channel in hex color '{hex}'"))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .context(format!("Invalid green channel in hex color '{hex}'"))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .context(format!("Invalid blue channel in hex color '{hex}'"))?;

        Ok(Self::new(r, g, b))
    }

    /// Converts the color to a hex string in the format "#RRGGBB" (uppercase).
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Returns the channels as an `[r, g, b]` array.
    #[must_use]
    pub const fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Perceptual brightness correction for light colors.
    ///
    /// Each channel becomes `floor(v^0.5 * 18)`, clamped to 255. The top end
    /// saturates early (anything above ~200 is full brightness) so that dim
    /// lights stay distinguishable from off.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpf_playfield::models::RgbColor;
    ///
    /// let corrected = RgbColor::new(0, 128, 255).gamma_corrected();
    /// assert_eq!(corrected, RgbColor::new(0, 203, 255));
    /// ```
    #[must_use]
    pub fn gamma_corrected(&self) -> Self {
        let [r, g, b] = color_gamma(self.channels());
        Self::new(r, g, b)
    }
}

/// Applies the playfield gamma curve to a raw channel triple.
#[must_use]
pub fn color_gamma(color: [u8; 3]) -> [u8; 3] {
    color.map(|value| {
        let corrected = (f64::from(value).powf(GAMMA) * GAMMA_SCALE).floor();
        corrected.min(255.0) as u8
    })
}

impl From<[u8; 3]> for RgbColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for RgbColor {
    /// Default color is black (an unlit device).
    fn default() -> Self {
        Self::BLACK
    }
}
