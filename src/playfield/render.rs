//! Widget rendering.
//!
//! Rendering is a pure function from widget state to a list of
//! [`DrawCommand`]s in the widget's local coordinates (origin at the widget
//! position). The host replays them on its painter after translating to the
//! widget's scene position.

use serde::Serialize;

use super::{PlacedDeviceWidget, PlayfieldError};
use crate::constants::OUTLINE_WIDTH;
use crate::models::{DeviceKind, DeviceState, Point, Rect, RgbColor, Shape};

/// Outline pen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pen {
    /// Stroke color
    pub color: RgbColor,
    /// Stroke width in scene units
    pub width: f64,
}

impl Pen {
    /// Solid white outline used for every widget.
    pub const OUTLINE: Self = Self {
        color: RgbColor::WHITE,
        width: OUTLINE_WIDTH,
    };
}

/// One painter operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Toggle antialiasing
    Antialiasing(bool),
    /// Set the outline pen
    SetPen(Pen),
    /// Rotate the coordinate system clockwise by this many degrees
    Rotate(f64),
    /// Set the solid fill color
    SetBrush(RgbColor),
    /// Ellipse inscribed in the rectangle
    Ellipse(Rect),
    /// Rectangle
    Rectangle(Rect),
    /// Closed polygon
    Polygon(Vec<Point>),
}

/// Fill color for a device's current state.
///
/// Lights use their gamma-corrected color, switches are green when active and
/// black otherwise. Other device types have no brush.
pub fn colored_brush(device_type: &str, device: &DeviceState) -> Result<RgbColor, PlayfieldError> {
    match DeviceKind::from_type(device_type) {
        Some(DeviceKind::Light) => device
            .color()
            .map(|color| color.gamma_corrected())
            .ok_or_else(|| PlayfieldError::MissingAttribute {
                device_type: device_type.to_string(),
                name: device.name().to_string(),
                attribute: "color",
            }),
        Some(DeviceKind::Switch) => Ok(if device.is_active() {
            RgbColor::GREEN
        } else {
            RgbColor::BLACK
        }),
        None => Err(PlayfieldError::UnsupportedDeviceType(device_type.to_string())),
    }
}

/// Resolves [`Shape::Default`] to the device type's outline.
pub fn effective_shape(shape: Shape, device_type: &str) -> Result<Shape, PlayfieldError> {
    if !shape.is_default() {
        return Ok(shape);
    }

    match DeviceKind::from_type(device_type) {
        Some(DeviceKind::Light) => Ok(Shape::Circle),
        Some(DeviceKind::Switch) => Ok(Shape::Square),
        None => Err(PlayfieldError::UnsupportedDeviceType(device_type.to_string())),
    }
}

/// Geometry of a concrete shape at the given pixel size.
///
/// [`Shape::Default`] must be resolved first; it draws as a circle here.
#[must_use]
pub fn shape_geometry(shape: Shape, device_size: f64) -> DrawCommand {
    let d = device_size;
    match shape {
        Shape::Default | Shape::Circle => DrawCommand::Ellipse(Rect::centered(d, d)),
        Shape::Square => DrawCommand::Rectangle(Rect::centered(d, d)),
        Shape::Rectangle => DrawCommand::Rectangle(Rect::centered(d * 0.4, d)),
        Shape::Triangle => DrawCommand::Polygon(isosceles(d, 0.6, 1.0)),
        Shape::Flipper => DrawCommand::Polygon(isosceles(d, 0.7, 5.0)),
        Shape::Arrow => DrawCommand::Polygon(arrow(d)),
    }
}

/// Triangle with its apex above the origin and its base below.
/// `aspect` stretches the base downwards.
fn isosceles(device_size: f64, scale: f64, aspect: f64) -> Vec<Point> {
    let s = device_size * scale;
    let base_y = s / 2.0 * aspect;
    vec![
        Point::new(0.0, -s),
        Point::new(-s, base_y),
        Point::new(s, base_y),
    ]
}

// Unit arrow, apex up:
//   (0,-10) (-5,0) (-2,0) (-2,5) (2,5) (2,0) (5,0)
fn arrow(device_size: f64) -> Vec<Point> {
    let s = device_size * 0.8;
    vec![
        Point::new(0.0, -s),
        Point::new(-s / 2.0, 0.0),
        Point::new(-s / 4.0, 0.0),
        Point::new(-s / 4.0, s / 2.0),
        Point::new(s / 4.0, s / 2.0),
        Point::new(s / 4.0, 0.0),
        Point::new(s / 2.0, 0.0),
    ]
}

/// Draw commands for a widget.
pub fn render(widget: &PlacedDeviceWidget) -> Result<Vec<DrawCommand>, PlayfieldError> {
    let brush = widget.colored_brush()?;
    let shape = effective_shape(widget.shape(), widget.device_type())?;

    Ok(vec![
        DrawCommand::Antialiasing(true),
        DrawCommand::SetPen(Pen::OUTLINE),
        DrawCommand::Rotate(f64::from(widget.rotation())),
        DrawCommand::SetBrush(brush),
        shape_geometry(shape, widget.device_size()),
    ])
}
