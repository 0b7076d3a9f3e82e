//! Live device state and the registry that hands it out.
//!
//! Device states belong to the monitor's device list; the playfield only
//! reads their attributes and registers a single change listener per device.

use serde_json::{Map, Value};
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::RgbColor;

/// Device type string for lights.
pub const LIGHT: &str = "light";
/// Device type string for switches.
pub const SWITCH: &str = "switch";

/// Device types the playfield knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// A light, drawn in its current color
    Light,
    /// A switch, drawn green when active
    Switch,
}

impl DeviceKind {
    /// Maps a device type string to a drawable kind.
    #[must_use]
    pub fn from_type(device_type: &str) -> Option<Self> {
        match device_type {
            LIGHT => Some(Self::Light),
            SWITCH => Some(Self::Switch),
            _ => None,
        }
    }
}

/// Signal delivered to a device's change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSignal {
    /// The listener is being retired and must tear itself down
    pub destroy: bool,
    /// The device's size settings changed
    pub resize: bool,
}

impl ChangeSignal {
    /// Plain state change: repaint only.
    pub const REPAINT: Self = Self {
        destroy: false,
        resize: false,
    };

    /// Listener retirement.
    pub const DESTROY: Self = Self {
        destroy: true,
        resize: false,
    };
}

/// Callback registered on a [`DeviceState`].
pub type ChangeListener = Rc<dyn Fn(ChangeSignal)>;

/// Live state of one device, as reported by the machine.
pub struct DeviceState {
    device_type: String,
    name: String,
    data: RefCell<Map<String, Value>>,
    listener: RefCell<Option<ChangeListener>>,
}

impl DeviceState {
    /// Creates a device state with the given initial attributes.
    pub fn new(
        device_type: impl Into<String>,
        name: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            name: name.into(),
            data: RefCell::new(data),
            listener: RefCell::new(None),
        }
    }

    /// Device type, e.g. `"light"`.
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Device name, e.g. `"l_shoot_again"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current attributes.
    pub fn data(&self) -> Ref<'_, Map<String, Value>> {
        self.data.borrow()
    }

    /// Merges new attribute values and notifies the listener.
    pub fn update(&self, changes: Map<String, Value>) {
        self.data.borrow_mut().extend(changes);
        self.notify(ChangeSignal::REPAINT);
    }

    /// Sets a single attribute and notifies the listener.
    pub fn set(&self, key: &str, value: Value) {
        self.data.borrow_mut().insert(key.to_string(), value);
        self.notify(ChangeSignal::REPAINT);
    }

    /// Installs `listener` and returns the one it replaced.
    ///
    /// The caller owns the returned listener and is expected to retire it.
    pub fn set_change_listener(&self, listener: ChangeListener) -> Option<ChangeListener> {
        self.listener.replace(Some(listener))
    }

    /// Removes and returns the registered listener.
    pub fn take_change_listener(&self) -> Option<ChangeListener> {
        self.listener.take()
    }

    /// Returns true if a listener is registered.
    pub fn has_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Signals destruction to the current listener and unregisters it.
    ///
    /// Used when the device is removed or redefined.
    pub fn retire(&self) {
        if let Some(listener) = self.take_change_listener() {
            listener(ChangeSignal::DESTROY);
        }
    }

    /// Calls the listener, if any. The listener is cloned out first so it may
    /// re-register from inside the callback.
    pub fn notify(&self, signal: ChangeSignal) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(signal);
        }
    }

    /// The `color` attribute as an RGB triple.
    ///
    /// Accepts a `[r, g, b]` array (channels clamped to 0-255) or a hex string.
    pub fn color(&self) -> Option<RgbColor> {
        match self.data.borrow().get("color")? {
            Value::Array(channels) if channels.len() == 3 => {
                let mut rgb = [0u8; 3];
                for (slot, channel) in rgb.iter_mut().zip(channels) {
                    *slot = channel.as_f64()?.clamp(0.0, 255.0) as u8;
                }
                Some(RgbColor::from(rgb))
            }
            Value::String(hex) => RgbColor::from_hex(hex).ok(),
            _ => None,
        }
    }

    /// Truthiness of the `state` attribute; missing counts as inactive.
    pub fn is_active(&self) -> bool {
        self.data.borrow().get("state").is_some_and(is_truthy)
    }
}

impl fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceState")
            .field("device_type", &self.device_type)
            .field("name", &self.name)
            .field("data", &self.data.borrow())
            .field("has_listener", &self.has_listener())
            .finish()
    }
}

/// Loose truthiness for reported attribute values.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Source of live device states, looked up when a device is dropped onto
/// the playfield or replayed from the layout.
pub trait DeviceRegistry {
    /// Returns the state for `(device_type, name)`, if the machine has it.
    fn device_state(&self, device_type: &str, name: &str) -> Option<Rc<DeviceState>>;
}

/// In-memory registry keyed by device type then name.
#[derive(Debug, Default)]
pub struct DeviceStates {
    devices: BTreeMap<String, BTreeMap<String, Rc<DeviceState>>>,
}

impl DeviceStates {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device, returning the shared handle.
    ///
    /// Redefining an existing device retires the old state's listener.
    pub fn insert(&mut self, state: DeviceState) -> Rc<DeviceState> {
        let state = Rc::new(state);
        let previous = self
            .devices
            .entry(state.device_type().to_string())
            .or_default()
            .insert(state.name().to_string(), Rc::clone(&state));
        if let Some(previous) = previous {
            previous.retire();
        }
        state
    }

    /// Removes a device and retires its listener.
    pub fn remove(&mut self, device_type: &str, name: &str) -> Option<Rc<DeviceState>> {
        let removed = self.devices.get_mut(device_type)?.remove(name)?;
        removed.retire();
        Some(removed)
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.values().map(BTreeMap::len).sum()
    }

    /// Returns true when no devices are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeviceRegistry for DeviceStates {
    fn device_state(&self, device_type: &str, name: &str) -> Option<Rc<DeviceState>> {
        self.devices.get(device_type)?.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_set_change_listener_returns_previous() {
        let state = DeviceState::new(LIGHT, "l_test", Map::new());
        let first: ChangeListener = Rc::new(|_| {});
        assert!(state.set_change_listener(first).is_none());

        let second: ChangeListener = Rc::new(|_| {});
        assert!(state.set_change_listener(second).is_some());
        assert!(state.has_listener());
    }

    #[test]
    fn test_update_notifies_listener() {
        let state = DeviceState::new(SWITCH, "s_test", attrs(json!({"state": false})));
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        state.set_change_listener(Rc::new(move |signal| {
            assert_eq!(signal, ChangeSignal::REPAINT);
            seen.set(seen.get() + 1);
        }));

        state.update(attrs(json!({"state": true})));
        assert_eq!(calls.get(), 1);
        assert!(state.is_active());
    }

    #[test]
    fn test_retire_sends_destroy_and_unregisters() {
        let state = DeviceState::new(LIGHT, "l_test", Map::new());
        let destroyed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&destroyed);
        state.set_change_listener(Rc::new(move |signal| seen.set(signal.destroy)));

        state.retire();
        assert!(destroyed.get());
        assert!(!state.has_listener());
    }

    #[test]
    fn test_color_parsing() {
        let state = DeviceState::new(LIGHT, "l", attrs(json!({"color": [0, 128, 300]})));
        assert_eq!(state.color(), Some(RgbColor::new(0, 128, 255)));

        state.set("color", json!("#102030"));
        assert_eq!(state.color(), Some(RgbColor::new(16, 32, 48)));

        state.set("color", json!([1, 2]));
        assert_eq!(state.color(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("active")));
        assert!(!is_truthy(&json!(false)));
    }

    #[test]
    fn test_registry_redefine_retires_old_listener() {
        let mut registry = DeviceStates::new();
        let old = registry.insert(DeviceState::new(LIGHT, "l_a", Map::new()));
        let destroyed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&destroyed);
        old.set_change_listener(Rc::new(move |signal| seen.set(signal.destroy)));

        let new = registry.insert(DeviceState::new(LIGHT, "l_a", Map::new()));
        assert!(destroyed.get());
        assert!(Rc::ptr_eq(&registry.device_state(LIGHT, "l_a").unwrap(), &new));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(LIGHT, "l_a").is_some());
        assert!(registry.device_state(LIGHT, "l_a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_device_kind() {
        assert_eq!(DeviceKind::from_type("light"), Some(DeviceKind::Light));
        assert_eq!(DeviceKind::from_type("switch"), Some(DeviceKind::Switch));
        assert_eq!(DeviceKind::from_type("coil"), None);
    }
}
