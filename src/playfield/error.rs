//! Typed playfield errors.

use thiserror::Error;

/// Errors raised while resolving how a widget is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayfieldError {
    /// Only lights and switches have a brush and a default shape.
    #[error("unsupported device type '{0}': only lights and switches can be drawn")]
    UnsupportedDeviceType(String),

    /// The device state lacks the attribute its brush is derived from.
    #[error("{device_type} '{name}' has no usable '{attribute}' attribute")]
    MissingAttribute {
        /// Device type
        device_type: String,
        /// Device name
        name: String,
        /// Attribute that was missing or malformed
        attribute: &'static str,
    },
}
