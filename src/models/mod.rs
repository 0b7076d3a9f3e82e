//! Data models for playfield placements, device state and geometry.
//!
//! This module contains the plain data structures used throughout the crate.
//! Models are independent of the scene graph and of any host toolkit.

pub mod device;
pub mod geometry;
pub mod placement;
pub mod rgb;
pub mod shape;

// Re-export all model types
pub use device::{
    ChangeListener, ChangeSignal, DeviceKind, DeviceRegistry, DeviceState, DeviceStates,
};
pub use geometry::{Point, Rect, SceneSize};
pub use placement::{DevicePlacement, PlayfieldLayout};
pub use rgb::RgbColor;
pub use shape::Shape;
