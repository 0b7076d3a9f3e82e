//! Playfield surface: drop target and widget factory.
//!
//! The surface is the playfield image item. It accepts devices dragged from
//! the device list, recreates saved widgets at startup, and owns the scene
//! graph the widgets live in.

use anyhow::Result;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use super::render::DrawCommand;
use super::widget::{PlacedDeviceWidget, WidgetSpec};
use super::{PlayfieldContext, PlayfieldError, SceneGraph, WidgetHandle};
use crate::models::{DeviceRegistry, DeviceState, Point, Rect, SceneSize, Shape};

/// Device dragged from the device list, with the drop position in scene space.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    /// Device type, e.g. `"switch"`
    pub device_type: String,
    /// Device name
    pub device_name: String,
    /// Drop position in scene coordinates
    pub scene_pos: Point,
}

impl DragPayload {
    /// Creates a payload.
    pub fn new(device_type: impl Into<String>, device_name: impl Into<String>, scene_pos: Point) -> Self {
        Self {
            device_type: device_type.into(),
            device_name: device_name.into(),
            scene_pos,
        }
    }
}

/// Rendered widget, ready for the host's painter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetFrame {
    /// Device type
    pub device_type: String,
    /// Device name
    pub device_name: String,
    /// Scene position the commands are relative to
    pub position: Point,
    /// Region to repaint in scene coordinates
    pub bounds: Rect,
    /// Draw commands, or why the widget cannot be drawn
    #[serde(serialize_with = "serialize_commands")]
    pub commands: Result<Vec<DrawCommand>, PlayfieldError>,
}

fn serialize_commands<S: serde::Serializer>(
    commands: &Result<Vec<DrawCommand>, PlayfieldError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match commands {
        Ok(commands) => commands.serialize(serializer),
        Err(e) => serializer.serialize_str(&e.to_string()),
    }
}

/// The playfield image item hosting all device widgets.
#[derive(Debug)]
pub struct PlayfieldSurface {
    context: Rc<PlayfieldContext>,
    scene: Rc<RefCell<SceneGraph>>,
}

impl PlayfieldSurface {
    /// Creates an empty surface over `context`.
    pub fn new(context: Rc<PlayfieldContext>) -> Self {
        Self {
            context,
            scene: Rc::new(RefCell::new(SceneGraph::new())),
        }
    }

    /// Shared playfield context.
    pub fn context(&self) -> &Rc<PlayfieldContext> {
        &self.context
    }

    /// The scene graph holding the widgets.
    pub fn scene(&self) -> &Rc<RefCell<SceneGraph>> {
        &self.scene
    }

    /// Scene dimensions (the playfield image size).
    pub fn scene_size(&self) -> SceneSize {
        self.context.scene_size()
    }

    /// Number of widgets on the playfield.
    pub fn widget_count(&self) -> usize {
        self.scene.borrow().len()
    }

    /// Recreates a widget from its saved placement.
    ///
    /// Entries without both coordinates are devices that were never placed;
    /// they are skipped and `Ok(None)` is returned. Nothing is written back.
    pub fn create_widget_from_config(
        &self,
        device: Rc<DeviceState>,
        device_type: &str,
        device_name: &str,
    ) -> Result<Option<WidgetHandle>> {
        let spec = {
            let store = self.context.store();
            let Some(entry) = store.entry(device_type, device_name) else {
                return Ok(None);
            };
            let Some((x, y)) = entry.position() else {
                return Ok(None);
            };

            let position = self.scene_size().denormalize(Point::new(x, y));
            WidgetSpec::new(device_type, device_name, position)
                .with_size(entry.size.unwrap_or_else(|| self.context.default_device_size()))
                .with_rotation(entry.rotation.unwrap_or(0))
                .with_shape(entry.shape.as_deref().map(Shape::parse).unwrap_or_default())
        };

        self.create_pf_widget(device, spec, false).map(Some)
    }

    /// Accepts any proposed drag.
    pub fn drag_enter(&self, _payload: &DragPayload) -> bool {
        true
    }

    /// Accepts any proposed drag.
    pub fn drag_move(&self, payload: &DragPayload) -> bool {
        self.drag_enter(payload)
    }

    /// Places a dropped device and saves the layout.
    ///
    /// Devices the registry does not know are rejected with a warning.
    pub fn drop(
        &self,
        payload: &DragPayload,
        registry: &dyn DeviceRegistry,
    ) -> Result<Option<WidgetHandle>> {
        let Some(device) = registry.device_state(&payload.device_type, &payload.device_name) else {
            warn!(
                device_type = %payload.device_type,
                name = %payload.device_name,
                "Invalid device dragged."
            );
            return Ok(None);
        };

        let spec = WidgetSpec::new(&payload.device_type, &payload.device_name, payload.scene_pos);
        self.create_pf_widget(device, spec, true).map(Some)
    }

    /// Creates a widget and adds it to the scene.
    pub fn create_pf_widget(
        &self,
        device: Rc<DeviceState>,
        spec: WidgetSpec,
        save: bool,
    ) -> Result<WidgetHandle> {
        let widget = PlacedDeviceWidget::spawn(&self.context, &self.scene, device, spec, save)?;
        let id = widget.borrow().id();
        self.scene.borrow_mut().add(id, Rc::clone(&widget));
        Ok(widget)
    }

    /// Recreates every saved widget whose device the registry knows.
    /// Returns the number of widgets created.
    pub fn replay_config(&self, registry: &dyn DeviceRegistry) -> Result<usize> {
        let keys: Vec<(String, String)> = self
            .context
            .store()
            .layout()
            .iter()
            .map(|(device_type, name, _)| (device_type.to_string(), name.to_string()))
            .collect();

        let mut created = 0;
        for (device_type, name) in keys {
            let Some(device) = registry.device_state(&device_type, &name) else {
                debug!(%device_type, %name, "saved device not present on this machine");
                continue;
            };
            if self.create_widget_from_config(device, &device_type, &name)?.is_some() {
                created += 1;
            }
        }

        Ok(created)
    }

    /// Resets every widget to the default size and saves the layout once.
    pub fn reset_all_sizes(&self, force: bool) -> Result<()> {
        let widgets: Vec<WidgetHandle> = self.scene.borrow().widgets().cloned().collect();
        for widget in widgets {
            widget.borrow_mut().resize_to_default(force)?;
        }
        self.context.store_mut().save()
    }

    /// Finds a placed widget by device.
    pub fn find(&self, device_type: &str, device_name: &str) -> Option<WidgetHandle> {
        self.scene
            .borrow()
            .widgets()
            .find(|widget| {
                let widget = widget.borrow();
                widget.device_type() == device_type && widget.name() == device_name
            })
            .cloned()
    }

    /// Topmost widget under a scene point.
    pub fn widget_at(&self, scene_pos: Point) -> Option<WidgetHandle> {
        self.scene
            .borrow()
            .widgets()
            .rev()
            .find(|widget| widget.borrow().scene_bounds().contains(scene_pos))
            .cloned()
    }

    /// Destroys widgets whose device was retired while they were busy.
    /// Returns the number of widgets removed.
    pub fn sweep_retired(&self) -> Result<usize> {
        let retired: Vec<WidgetHandle> = self
            .scene
            .borrow()
            .widgets()
            .filter(|widget| widget.try_borrow().is_ok_and(|w| w.is_destroy_pending()))
            .cloned()
            .collect();

        for widget in &retired {
            widget.borrow().destroy()?;
        }

        Ok(retired.len())
    }

    /// Renders every widget, bottom to top. Retired widgets are swept first.
    pub fn render_scene(&self) -> Vec<WidgetFrame> {
        if let Err(e) = self.sweep_retired() {
            warn!("failed to remove retired widget: {e:#}");
        }

        self.scene
            .borrow()
            .widgets()
            .map(|widget| {
                let widget = widget.borrow();
                widget.take_repaint();
                WidgetFrame {
                    device_type: widget.device_type().to_string(),
                    device_name: widget.name().to_string(),
                    position: widget.position(),
                    bounds: widget.scene_bounds(),
                    commands: widget.render(),
                }
            })
            .collect()
    }

    /// Scene regions of widgets waiting for a repaint. Clears the requests.
    pub fn take_dirty_regions(&self) -> Vec<Rect> {
        self.scene
            .borrow()
            .widgets()
            .filter_map(|widget| {
                let widget = widget.borrow();
                widget.take_repaint().then(|| widget.scene_bounds())
            })
            .collect()
    }
}
