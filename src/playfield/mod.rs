//! Interactive playfield layer.
//!
//! The playfield is a scene the size of the playfield image. Device widgets
//! live in a [`SceneGraph`] and share one [`PlayfieldContext`] holding the
//! scene dimensions, global settings, the layout store and the outbound
//! command and inspector hooks.
//!
//! Everything here runs on the host's UI thread. Shared state uses `Rc`,
//! `RefCell` and `Cell`; device-state notifications must be delivered on
//! that same thread.

pub mod error;
pub mod render;
pub mod surface;
pub mod view;
pub mod widget;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::constants::DEFAULT_DEVICE_SIZE;
use crate::models::SceneSize;
use crate::services::LayoutStore;

pub use error::PlayfieldError;
pub use render::{colored_brush, effective_shape, render, DrawCommand, Pen};
pub use surface::{DragPayload, PlayfieldSurface, WidgetFrame};
pub use view::{PlayfieldView, ViewHost, ViewTransform};
pub use widget::{InteractionState, PlacedDeviceWidget, PointerButton, WidgetSpec};

/// Shared, mutable handle to a placed widget.
pub type WidgetHandle = Rc<RefCell<PlacedDeviceWidget>>;

/// Process-unique identity of a widget instance.
///
/// Two widgets bound to the same device have different ids, which is how the
/// scene graph removes a displaced widget without touching its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

/// Outbound device command channel.
pub trait CommandChannel {
    /// Fire-and-forget command; `state` is [`crate::constants::TOGGLE_STATE`] to toggle.
    fn send(&self, device_type: &str, name: &str, state: i32);
}

impl<F: Fn(&str, &str, i32)> CommandChannel for F {
    fn send(&self, device_type: &str, name: &str, state: i32) {
        self(device_type, name, state);
    }
}

/// Receiver of widgets selected while the inspector is enabled.
pub trait InspectorSink {
    /// Called with the widget the user clicked.
    fn last_selected(&self, widget: &PlacedDeviceWidget);
}

impl<F: Fn(&PlacedDeviceWidget)> InspectorSink for F {
    fn last_selected(&self, widget: &PlacedDeviceWidget) {
        self(widget);
    }
}

/// A command recorded by [`CommandLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    /// Device type
    pub device_type: String,
    /// Device name
    pub name: String,
    /// Requested state
    pub state: i32,
}

/// Command channel that only records and logs. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    sent: Rc<RefCell<Vec<SentCommand>>>,
}

impl CommandLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.borrow().clone()
    }
}

impl CommandChannel for CommandLog {
    fn send(&self, device_type: &str, name: &str, state: i32) {
        debug!(device_type, name, state, "device command");
        self.sent.borrow_mut().push(SentCommand {
            device_type: device_type.to_string(),
            name: name.to_string(),
            state,
        });
    }
}

/// Inspector sink that records `(device_type, device_name)` of each selection.
#[derive(Debug, Clone, Default)]
pub struct InspectorLog {
    selected: Rc<RefCell<Vec<(String, String)>>>,
}

impl InspectorLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selections so far, oldest first.
    #[must_use]
    pub fn selected(&self) -> Vec<(String, String)> {
        self.selected.borrow().clone()
    }
}

impl InspectorSink for InspectorLog {
    fn last_selected(&self, widget: &PlacedDeviceWidget) {
        self.selected
            .borrow_mut()
            .push((widget.device_type().to_string(), widget.name().to_string()));
    }
}

/// State shared by every widget on one playfield.
pub struct PlayfieldContext {
    scene_size: Cell<SceneSize>,
    default_device_size: Cell<f64>,
    inspector_enabled: Cell<bool>,
    store: RefCell<LayoutStore>,
    commands: Box<dyn CommandChannel>,
    inspector: Box<dyn InspectorSink>,
    next_widget_id: Cell<u64>,
}

impl PlayfieldContext {
    /// Creates a context with the default device size and the inspector off.
    pub fn new(
        scene_size: SceneSize,
        store: LayoutStore,
        commands: impl CommandChannel + 'static,
        inspector: impl InspectorSink + 'static,
    ) -> Self {
        Self {
            scene_size: Cell::new(scene_size),
            default_device_size: Cell::new(DEFAULT_DEVICE_SIZE),
            inspector_enabled: Cell::new(false),
            store: RefCell::new(store),
            commands: Box::new(commands),
            inspector: Box::new(inspector),
            next_widget_id: Cell::new(0),
        }
    }

    /// Sets the global default device size.
    #[must_use]
    pub fn with_default_device_size(self, size: f64) -> Self {
        self.default_device_size.set(size);
        self
    }

    /// Current scene dimensions.
    pub fn scene_size(&self) -> SceneSize {
        self.scene_size.get()
    }

    /// Replaces the scene dimensions (a new playfield image was loaded).
    pub fn set_scene_size(&self, size: SceneSize) {
        self.scene_size.set(size);
    }

    /// Default widget size as a fraction of scene width.
    pub fn default_device_size(&self) -> f64 {
        self.default_device_size.get()
    }

    /// Changes the default widget size. Existing widgets keep their size
    /// until resized.
    pub fn set_default_device_size(&self, size: f64) {
        self.default_device_size.set(size);
    }

    /// True while clicks select widgets for inspection instead of sending commands.
    pub fn inspector_enabled(&self) -> bool {
        self.inspector_enabled.get()
    }

    /// Turns inspector mode on or off.
    pub fn set_inspector_enabled(&self, enabled: bool) {
        self.inspector_enabled.set(enabled);
    }

    /// Shared access to the layout store.
    pub fn store(&self) -> Ref<'_, LayoutStore> {
        self.store.borrow()
    }

    /// Exclusive access to the layout store.
    pub fn store_mut(&self) -> RefMut<'_, LayoutStore> {
        self.store.borrow_mut()
    }

    /// Sends a device command.
    pub fn send_command(&self, device_type: &str, name: &str, state: i32) {
        self.commands.send(device_type, name, state);
    }

    /// Hands a widget to the inspector.
    pub fn select_for_inspection(&self, widget: &PlacedDeviceWidget) {
        self.inspector.last_selected(widget);
    }

    fn allocate_widget_id(&self) -> WidgetId {
        let id = self.next_widget_id.get();
        self.next_widget_id.set(id + 1);
        WidgetId(id)
    }
}

impl fmt::Debug for PlayfieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayfieldContext")
            .field("scene_size", &self.scene_size.get())
            .field("default_device_size", &self.default_device_size.get())
            .field("inspector_enabled", &self.inspector_enabled.get())
            .finish_non_exhaustive()
    }
}

/// Widgets currently on the playfield, in stacking order (last is topmost).
#[derive(Debug, Default)]
pub struct SceneGraph {
    items: Vec<(WidgetId, WidgetHandle)>,
}

impl SceneGraph {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a widget on top of the stack.
    pub fn add(&mut self, id: WidgetId, widget: WidgetHandle) {
        self.items.push((id, widget));
    }

    /// Removes the widget with `id`, returning it.
    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetHandle> {
        let index = self.items.iter().position(|(item_id, _)| *item_id == id)?;
        Some(self.items.remove(index).1)
    }

    /// Widgets bottom to top.
    pub fn widgets(&self) -> impl DoubleEndedIterator<Item = &WidgetHandle> {
        self.items.iter().map(|(_, widget)| widget)
    }

    /// Number of widgets in the scene.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the scene holds no widgets.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
