//! Placed device widget.
//!
//! A [`PlacedDeviceWidget`] is one device drawn on the playfield. It owns the
//! widget's geometry (pixel position, size, rotation, shape), keeps the
//! device's layout entry in sync, and turns pointer input into device
//! commands, inspector selections or drags.
//!
//! # Persistence
//!
//! Positions are stored as fractions of the scene. Optional keys are only
//! written when they differ from their defaults: `shape` is absent for
//! [`Shape::Default`], `rotation` is absent for 0, and `size` is absent when
//! equal to the global default device size.
//!
//! # Click or drag
//!
//! Pointer moves during the first 0.3 s after a press are ignored so a click
//! never nudges a widget. A drag only commits its new position if the press
//! lasted longer than 0.5 s.

use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, error, warn};

use super::render::{self, DrawCommand};
use super::{PlayfieldContext, PlayfieldError, SceneGraph, WidgetHandle, WidgetId};
use crate::constants::{DRAG_COMMIT_DELAY_SECS, DRAG_START_DELAY_SECS, TOGGLE_STATE};
use crate::models::device::SWITCH;
use crate::models::{ChangeListener, ChangeSignal, DeviceState, Point, Rect, RgbColor, Shape};

/// Mouse buttons a widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Primary button: momentary switch press
    Left,
    /// Secondary button: latching switch toggle
    Right,
}

/// Where a widget is in its press/drag cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// No button held
    Idle,
    /// Button held, widget not moved yet
    Pressed,
    /// Button held and the widget follows the pointer
    Dragging,
}

/// Everything needed to place a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    /// Device type, e.g. `"light"`
    pub device_type: String,
    /// Device name
    pub device_name: String,
    /// Pixel position in scene space
    pub position: Point,
    /// Size as a fraction of scene width; `None` uses the global default
    pub size: Option<f64>,
    /// Rotation in degrees, any integer
    pub rotation: i64,
    /// Outline shape
    pub shape: Shape,
}

impl WidgetSpec {
    /// Spec with default size, rotation and shape.
    pub fn new(device_type: impl Into<String>, device_name: impl Into<String>, position: Point) -> Self {
        Self {
            device_type: device_type.into(),
            device_name: device_name.into(),
            position,
            size: None,
            rotation: 0,
            shape: Shape::Default,
        }
    }

    /// Sets the size fraction.
    #[must_use]
    pub const fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: i64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the shape.
    #[must_use]
    pub const fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// A device drawn on the playfield.
pub struct PlacedDeviceWidget {
    id: WidgetId,
    context: Rc<PlayfieldContext>,
    scene: Weak<RefCell<SceneGraph>>,
    device: Rc<DeviceState>,
    device_type: String,
    name: String,
    position: Point,
    size: f64,
    device_size: f64,
    rotation: i32,
    shape: Shape,
    move_in_progress: bool,
    click_start: Option<Instant>,
    pending_switch_release: bool,
    repaint_pending: Cell<bool>,
    destroyed: Cell<bool>,
    destroy_pending: Rc<Cell<bool>>,
}

impl PlacedDeviceWidget {
    /// Creates a widget bound to `device` and registers it as the device's
    /// change listener.
    ///
    /// A widget previously bound to the same device receives a destroy
    /// signal and removes itself (and its layout entry) before this widget
    /// writes its own entry, so the replacement's placement survives. The
    /// entry is flushed to storage only if `save` is set.
    ///
    /// The caller adds the returned handle to the scene graph.
    pub fn spawn(
        context: &Rc<PlayfieldContext>,
        scene: &Rc<RefCell<SceneGraph>>,
        device: Rc<DeviceState>,
        spec: WidgetSpec,
        save: bool,
    ) -> Result<WidgetHandle> {
        let mut widget = Self {
            id: context.allocate_widget_id(),
            context: Rc::clone(context),
            scene: Rc::downgrade(scene),
            device,
            device_type: spec.device_type,
            name: spec.device_name,
            position: spec.position,
            size: 0.0,
            device_size: 0.0,
            rotation: 0,
            shape: Shape::Default,
            move_in_progress: false,
            click_start: None,
            pending_switch_release: false,
            repaint_pending: Cell::new(true),
            destroyed: Cell::new(false),
            destroy_pending: Rc::new(Cell::new(false)),
        };
        widget.set_size(spec.size);
        widget.set_shape(spec.shape);
        widget.set_rotation(spec.rotation);

        let device = Rc::clone(&widget.device);
        let handle = Rc::new(RefCell::new(widget));

        if let Some(previous) = device.set_change_listener(Self::listener(&handle)) {
            debug!(
                device_type = device.device_type(),
                name = device.name(),
                "Previous widget exists."
            );
            previous(ChangeSignal::DESTROY);
        }

        handle.borrow().update_pos(save)?;
        Ok(handle)
    }

    /// Listener closure forwarding device signals to the widget. It holds a
    /// weak reference so a dropped widget is simply skipped.
    ///
    /// A destroy that finds the widget busy is parked in `destroy_pending`
    /// for [`PlayfieldSurface::sweep_retired`](super::PlayfieldSurface::sweep_retired).
    fn listener(handle: &WidgetHandle) -> ChangeListener {
        let weak = Rc::downgrade(handle);
        let destroy_pending = Rc::clone(&handle.borrow().destroy_pending);
        Rc::new(move |signal: ChangeSignal| {
            let Some(widget) = weak.upgrade() else {
                return;
            };
            let Ok(widget) = widget.try_borrow() else {
                if signal.destroy {
                    destroy_pending.set(true);
                    error!("device retired while its widget was busy; destroy deferred");
                } else {
                    warn!("device signal arrived while its widget was busy; dropped");
                }
                return;
            };
            if let Err(e) = widget.notify(signal) {
                error!(name = widget.name(), "failed to retire widget: {e:#}");
            }
        })
    }

    /// Scene-unique id of this instance.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Device type, e.g. `"light"`.
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound device state.
    pub fn device(&self) -> &Rc<DeviceState> {
        &self.device
    }

    /// Pixel position in scene space.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Moves the widget without persisting.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.request_repaint();
    }

    /// Size as a fraction of scene width.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Side length in scene pixels.
    pub fn device_size(&self) -> f64 {
        self.device_size
    }

    /// Rotation in degrees, always in `0..360`.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Configured shape (may be [`Shape::Default`]).
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Hover text.
    pub fn tooltip(&self) -> String {
        format!("{}: {}", self.device_type, self.name)
    }

    /// Square of side `device_size` centered on the widget origin.
    pub fn bounding_rect(&self) -> Rect {
        Rect::centered(self.device_size, self.device_size)
    }

    /// Bounding rectangle in scene coordinates.
    pub fn scene_bounds(&self) -> Rect {
        self.bounding_rect().translated(self.position)
    }

    /// Sets the shape. Accepts a [`Shape`] or a shape name; unknown names
    /// become [`Shape::Default`].
    pub fn set_shape(&mut self, shape: impl Into<Shape>) {
        self.shape = shape.into();
        self.request_repaint();
    }

    /// Sets the rotation, wrapping any integer into `0..360`.
    pub fn set_rotation(&mut self, angle: i64) {
        self.rotation = angle.rem_euclid(360) as i32;
        self.request_repaint();
    }

    /// Sets the size fraction (`None` for the global default) and recomputes
    /// the pixel size from the current scene width. Does not persist.
    pub fn set_size(&mut self, size: Option<f64>) {
        self.size = size.unwrap_or_else(|| self.context.default_device_size());
        self.device_size = self.context.scene_size().width * self.size;
        self.request_repaint();
    }

    /// Resets the size to the global default unless the layout pins it.
    ///
    /// With `force`, a pinned size is cleared first. The layout entry is
    /// refreshed but not saved so callers can batch several resets into one
    /// write.
    pub fn resize_to_default(&mut self, force: bool) -> Result<()> {
        let reset = {
            let mut store = self.context.store_mut();
            match store.entry_mut(&self.device_type, &self.name) {
                Some(entry) => {
                    if force {
                        entry.size = None;
                    }
                    entry.size.is_none()
                }
                None => false,
            }
        };

        if reset {
            self.set_size(None);
        }

        self.update_pos(false)
    }

    /// Writes this widget's normalized position, shape, rotation and size
    /// into its layout entry, then saves the layout if `save` is set.
    pub fn update_pos(&self, save: bool) -> Result<()> {
        let normalized = self.context.scene_size().normalize(self.position);
        let default_size = self.context.default_device_size();

        let mut store = self.context.store_mut();
        let entry = store.entry_or_insert(&self.device_type, &self.name);

        entry.x = Some(normalized.x);
        entry.y = Some(normalized.y);
        entry.shape = (!self.shape.is_default()).then(|| self.shape.name().to_string());
        entry.rotation = (self.rotation != 0).then_some(i64::from(self.rotation));
        entry.size = (self.size != default_size).then_some(self.size);

        if save {
            store.save()?;
        }

        Ok(())
    }

    /// Removes this device's layout entry and saves the layout.
    pub fn delete_from_config(&self) -> Result<()> {
        let mut store = self.context.store_mut();
        store.remove(&self.device_type, &self.name);
        store.save()
    }

    /// Handles a signal from the bound device: repaint, and tear down on
    /// `destroy`.
    pub fn notify(&self, signal: ChangeSignal) -> Result<()> {
        self.request_repaint();

        if signal.destroy {
            self.destroy()?;
        }

        Ok(())
    }

    /// Removes the widget from the scene and its entry from the layout.
    pub fn destroy(&self) -> Result<()> {
        debug!("Destroy device: {}", self.name);
        self.destroyed.set(true);

        if let Some(scene) = self.scene.upgrade() {
            scene.borrow_mut().remove(self.id);
        }

        self.delete_from_config()
    }

    /// True once the widget has been torn down.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// True when the device was retired but the widget has not been torn
    /// down yet.
    pub fn is_destroy_pending(&self) -> bool {
        self.destroy_pending.get() && !self.destroyed.get()
    }

    /// Marks the widget for repaint.
    pub fn request_repaint(&self) {
        self.repaint_pending.set(true);
    }

    /// Returns and clears the repaint flag.
    pub fn take_repaint(&self) -> bool {
        self.repaint_pending.replace(false)
    }

    /// Brush for the device's current state.
    pub fn colored_brush(&self) -> Result<RgbColor, PlayfieldError> {
        render::colored_brush(&self.device_type, &self.device)
    }

    /// Draw commands for the widget in its local coordinates.
    pub fn render(&self) -> Result<Vec<DrawCommand>, PlayfieldError> {
        render::render(self)
    }

    /// Current press/drag state.
    pub fn interaction(&self) -> InteractionState {
        match (self.click_start, self.move_in_progress) {
            (None, _) => InteractionState::Idle,
            (Some(_), false) => InteractionState::Pressed,
            (Some(_), true) => InteractionState::Dragging,
        }
    }

    /// True when a left-click on a switch is waiting to send its release toggle.
    pub fn pending_switch_release(&self) -> bool {
        self.pending_switch_release
    }

    /// Pointer pressed on the widget.
    ///
    /// Switches toggle immediately. A left press also queues a toggle for
    /// the release, making it a momentary press; a right press latches. In
    /// inspector mode nothing is sent and the widget is handed to the
    /// inspector instead.
    pub fn press(&mut self, button: PointerButton, now: Instant) {
        self.click_start = Some(now);

        if self.context.inspector_enabled() {
            self.pending_switch_release = false;
            self.send_to_inspector_window();
            debug!("{} {} {:?} clicked", self.device_type, self.name, button);
            return;
        }

        if self.device_type == SWITCH {
            self.context.send_command(SWITCH, &self.name, TOGGLE_STATE);
            self.pending_switch_release = button == PointerButton::Left;
        }
    }

    /// Pointer moved while pressed. Returns true if the widget moved.
    ///
    /// Moves are ignored until the drag delay has passed and whenever the
    /// pointer is off the playfield.
    pub fn pointer_move(&mut self, scene_pos: Point, now: Instant) -> bool {
        let Some(start) = self.click_start else {
            return false;
        };

        if !self.context.scene_size().strictly_contains(scene_pos) {
            return false;
        }

        if elapsed_secs(start, now) > DRAG_START_DELAY_SECS {
            self.set_position(scene_pos);
            self.move_in_progress = true;
            return true;
        }

        false
    }

    /// Pointer released.
    ///
    /// A drag held longer than the commit delay persists the new position.
    /// Otherwise a queued switch release toggle is sent.
    pub fn release(&mut self, now: Instant) -> Result<()> {
        let held = self.click_start.map(|start| elapsed_secs(start, now));

        let committed = held.is_some_and(|secs| secs > DRAG_COMMIT_DELAY_SECS);
        let result = if self.move_in_progress && committed {
            self.update_pos(true)
        } else {
            if self.pending_switch_release {
                self.context.send_command(SWITCH, &self.name, TOGGLE_STATE);
            }
            Ok(())
        };

        self.move_in_progress = false;
        self.pending_switch_release = false;
        self.click_start = None;
        result
    }

    /// Hands this widget to the inspector.
    pub fn send_to_inspector_window(&self) {
        self.context.select_for_inspection(self);
    }
}

fn elapsed_secs(start: Instant, now: Instant) -> f64 {
    now.saturating_duration_since(start).as_secs_f64()
}

impl fmt::Debug for PlacedDeviceWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedDeviceWidget")
            .field("id", &self.id)
            .field("device_type", &self.device_type)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("rotation", &self.rotation)
            .field("shape", &self.shape)
            .field("interaction", &self.interaction())
            .finish_non_exhaustive()
    }
}
