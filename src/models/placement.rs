//! Persisted widget placements.
//!
//! The layout maps `device_type -> device_name -> placement`. Positions are
//! stored as fractions of the scene so a layout survives a change of
//! playfield image resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One device's saved placement on the playfield.
///
/// Every field is optional on disk: an entry without `x`/`y` is a device that
/// has not been placed yet and is skipped at replay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DevicePlacement {
    /// Horizontal position as a fraction of scene width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical position as a fraction of scene height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Shape name; absent means the device-type default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    /// Rotation in degrees; absent means 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i64>,
    /// Size as a fraction of scene width; absent means the global default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl DevicePlacement {
    /// Creates a placement at normalized `(x, y)` with every optional key absent.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            shape: None,
            rotation: None,
            size: None,
        }
    }

    /// Returns the normalized position if both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }
}

/// All saved placements, keyed by device type then device name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayfieldLayout {
    devices: BTreeMap<String, BTreeMap<String, DevicePlacement>>,
}

impl PlayfieldLayout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a device's placement.
    #[must_use]
    pub fn entry(&self, device_type: &str, device_name: &str) -> Option<&DevicePlacement> {
        self.devices.get(device_type)?.get(device_name)
    }

    /// Mutable lookup of a device's placement.
    pub fn entry_mut(&mut self, device_type: &str, device_name: &str) -> Option<&mut DevicePlacement> {
        self.devices.get_mut(device_type)?.get_mut(device_name)
    }

    /// Returns the placement for a device, creating an empty one (and its
    /// device-type section) if needed.
    pub fn entry_or_insert(&mut self, device_type: &str, device_name: &str) -> &mut DevicePlacement {
        self.devices
            .entry(device_type.to_string())
            .or_default()
            .entry(device_name.to_string())
            .or_default()
    }

    /// Inserts or replaces a placement.
    pub fn insert(&mut self, device_type: &str, device_name: &str, placement: DevicePlacement) {
        self.devices
            .entry(device_type.to_string())
            .or_default()
            .insert(device_name.to_string(), placement);
    }

    /// Removes exactly one device's placement. The device-type section is kept.
    pub fn remove(&mut self, device_type: &str, device_name: &str) -> Option<DevicePlacement> {
        self.devices.get_mut(device_type)?.remove(device_name)
    }

    /// Iterates `(device_type, device_name, placement)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &DevicePlacement)> {
        self.devices.iter().flat_map(|(device_type, names)| {
            names
                .iter()
                .map(move |(name, placement)| (device_type.as_str(), name.as_str(), placement))
        })
    }

    /// Total number of stored placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.values().map(BTreeMap::len).sum()
    }

    /// Returns true when no placements are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_or_insert_creates_sections() {
        let mut layout = PlayfieldLayout::new();
        assert!(layout.entry("light", "l_shoot_again").is_none());

        layout.entry_or_insert("light", "l_shoot_again").x = Some(0.25);
        let entry = layout.entry("light", "l_shoot_again").unwrap();
        assert_eq!(entry.x, Some(0.25));
        assert_eq!(entry.position(), None);
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn test_remove_only_named_entry() {
        let mut layout = PlayfieldLayout::new();
        layout.insert("switch", "s_start", DevicePlacement::at(0.1, 0.9));
        layout.insert("switch", "s_tilt", DevicePlacement::at(0.2, 0.9));
        layout.insert("light", "s_start", DevicePlacement::at(0.3, 0.3));

        let removed = layout.remove("switch", "s_start");
        assert_eq!(removed, Some(DevicePlacement::at(0.1, 0.9)));
        assert!(layout.entry("switch", "s_tilt").is_some());
        assert!(layout.entry("light", "s_start").is_some());
        assert_eq!(layout.len(), 2);
        assert!(layout.remove("switch", "s_start").is_none());
    }

    #[test]
    fn test_iter_sorted() {
        let mut layout = PlayfieldLayout::new();
        layout.insert("switch", "b", DevicePlacement::at(0.0, 0.0));
        layout.insert("light", "z", DevicePlacement::at(0.0, 0.0));
        layout.insert("switch", "a", DevicePlacement::at(0.0, 0.0));

        let keys: Vec<_> = layout.iter().map(|(t, n, _)| (t, n)).collect();
        assert_eq!(keys, vec![("light", "z"), ("switch", "a"), ("switch", "b")]);
    }

    #[test]
    fn test_optional_keys_not_serialized() {
        let placement = DevicePlacement::at(0.5, 0.25);
        let json = serde_json::to_value(&placement).unwrap();
        assert_eq!(json, serde_json::json!({"x": 0.5, "y": 0.25}));
    }
}
