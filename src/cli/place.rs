//! Place a device on the playfield.

use crate::cli::common::{CliError, CliResult, GlobalOptions, Session};
use crate::models::{DeviceKind, Point, Shape};
use crate::playfield::DragPayload;
use clap::Args;

/// Place a device, replacing any existing placement
#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Device type (light or switch)
    pub device_type: String,

    /// Device name
    pub name: String,

    /// Horizontal position as a fraction of the playfield width
    #[arg(long)]
    pub x: f64,

    /// Vertical position as a fraction of the playfield height
    #[arg(long)]
    pub y: f64,

    /// Shape (DEFAULT, SQUARE, RECTANGLE, CIRCLE, TRIANGLE, ARROW, FLIPPER)
    #[arg(long)]
    pub shape: Option<String>,

    /// Rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<i64>,

    /// Size as a fraction of the playfield width
    #[arg(long)]
    pub size: Option<f64>,
}

impl PlaceArgs {
    /// Execute the place command
    pub fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        self.validate()?;

        let mut session = Session::open(options)?;
        session.ensure_device(&self.device_type, &self.name);

        let scene_pos = session
            .surface
            .scene_size()
            .denormalize(Point::new(self.x, self.y));
        let payload = DragPayload::new(&self.device_type, &self.name, scene_pos);

        let widget = session
            .surface
            .drop(&payload, &session.registry)
            .map_err(|e| CliError::io(format!("Failed to place device: {e:#}")))?
            .ok_or_else(|| CliError::validation(format!("Unknown device: {}", self.name)))?;

        if self.shape.is_some() || self.rotation.is_some() || self.size.is_some() {
            let mut widget = widget.borrow_mut();
            if let Some(shape) = &self.shape {
                widget.set_shape(shape.as_str());
            }
            if let Some(rotation) = self.rotation {
                widget.set_rotation(rotation);
            }
            if let Some(size) = self.size {
                widget.set_size(Some(size));
            }
            widget
                .update_pos(true)
                .map_err(|e| CliError::io(format!("Failed to save layout: {e:#}")))?;
        }

        let widget = widget.borrow();
        println!(
            "Placed {} at ({:.1}, {:.1}) as {}",
            widget.tooltip(),
            widget.position().x,
            widget.position().y,
            widget.shape()
        );

        Ok(())
    }

    fn validate(&self) -> CliResult<()> {
        if DeviceKind::from_type(&self.device_type).is_none() {
            return Err(CliError::validation(format!(
                "Unsupported device type '{}': expected light or switch",
                self.device_type
            )));
        }

        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CliError::validation(format!(
                    "{axis} must be between 0 and 1, got {value}"
                )));
            }
        }

        if let Some(size) = self.size {
            if size <= 0.0 || size > 1.0 {
                return Err(CliError::validation(format!(
                    "size must be in (0, 1], got {size}"
                )));
            }
        }

        if let Some(shape) = &self.shape {
            if Shape::parse(shape).is_default() && !shape.trim().eq_ignore_ascii_case("default") {
                return Err(CliError::validation(format!("Unknown shape '{shape}'")));
            }
        }

        Ok(())
    }
}
