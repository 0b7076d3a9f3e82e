//! Playfield layout store.
//!
//! [`LayoutStore`] is the single handle through which widgets read and write
//! their placements. Writes mutate the in-memory layout; [`LayoutStore::save`]
//! pushes the whole layout through a [`LayoutSink`].

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::models::{DevicePlacement, PlayfieldLayout};

/// Durable destination for a layout.
pub trait LayoutSink {
    /// Writes the full layout.
    fn flush(&mut self, layout: &PlayfieldLayout) -> Result<()>;
}

/// YAML layout file on disk.
#[derive(Debug, Clone)]
pub struct YamlLayoutFile {
    path: PathBuf,
}

impl YamlLayoutFile {
    /// Creates a handle for the layout file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the layout file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the layout. A missing file is an empty layout.
    pub fn load(&self) -> Result<PlayfieldLayout> {
        if !self.path.exists() {
            return Ok(PlayfieldLayout::new());
        }

        let content = fs::read_to_string(&self.path).context(format!(
            "Failed to read layout file: {}",
            self.path.display()
        ))?;

        if content.trim().is_empty() {
            return Ok(PlayfieldLayout::new());
        }

        serde_yml::from_str(&content).context(format!(
            "Failed to parse layout file: {}",
            self.path.display()
        ))
    }
}

impl LayoutSink for YamlLayoutFile {
    /// Uses temp file + rename so a crash never leaves a truncated layout.
    fn flush(&mut self, layout: &PlayfieldLayout) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context(format!(
                    "Failed to create layout directory: {}",
                    parent.display()
                ))?;
            }
        }

        let content = serde_yml::to_string(layout).context("Failed to serialize layout")?;
        let temp_path = self.path.with_extension("yaml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp layout file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &self.path).context(format!(
            "Failed to rename temp layout file to: {}",
            self.path.display()
        ))?;

        Ok(())
    }
}

/// Sink that keeps every flushed snapshot. Clones share the history.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    flushed: Rc<RefCell<Vec<PlayfieldLayout>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flushes so far.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushed.borrow().len()
    }

    /// The most recently flushed layout.
    #[must_use]
    pub fn last(&self) -> Option<PlayfieldLayout> {
        self.flushed.borrow().last().cloned()
    }
}

impl LayoutSink for MemorySink {
    fn flush(&mut self, layout: &PlayfieldLayout) -> Result<()> {
        self.flushed.borrow_mut().push(layout.clone());
        Ok(())
    }
}

/// In-memory layout plus the sink it saves to.
pub struct LayoutStore {
    layout: PlayfieldLayout,
    sink: Box<dyn LayoutSink>,
    dirty: bool,
}

impl LayoutStore {
    /// Creates a store over an already loaded layout.
    pub fn new(layout: PlayfieldLayout, sink: impl LayoutSink + 'static) -> Self {
        Self {
            layout,
            sink: Box::new(sink),
            dirty: false,
        }
    }

    /// Store that never touches disk; see [`MemorySink`].
    #[must_use]
    pub fn in_memory(layout: PlayfieldLayout) -> Self {
        Self::new(layout, MemorySink::new())
    }

    /// Loads a YAML layout file and saves back to it.
    pub fn open_yaml(path: impl Into<PathBuf>) -> Result<Self> {
        let file = YamlLayoutFile::new(path);
        let layout = file.load()?;
        Ok(Self::new(layout, file))
    }

    /// The current in-memory layout, including unsaved changes.
    pub fn layout(&self) -> &PlayfieldLayout {
        &self.layout
    }

    /// Looks up a device's placement.
    pub fn entry(&self, device_type: &str, device_name: &str) -> Option<&DevicePlacement> {
        self.layout.entry(device_type, device_name)
    }

    /// Mutable lookup of a device's placement. Marks the store dirty.
    pub fn entry_mut(&mut self, device_type: &str, device_name: &str) -> Option<&mut DevicePlacement> {
        let entry = self.layout.entry_mut(device_type, device_name)?;
        self.dirty = true;
        Some(entry)
    }

    /// Returns a device's placement, creating it if needed. Marks the store dirty.
    pub fn entry_or_insert(&mut self, device_type: &str, device_name: &str) -> &mut DevicePlacement {
        self.dirty = true;
        self.layout.entry_or_insert(device_type, device_name)
    }

    /// Removes one device's placement. Marks the store dirty if it existed.
    pub fn remove(&mut self, device_type: &str, device_name: &str) -> Option<DevicePlacement> {
        let removed = self.layout.remove(device_type, device_name);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Returns true if the layout changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flushes the layout to the sink.
    pub fn save(&mut self) -> Result<()> {
        self.sink.flush(&self.layout)?;
        self.dirty = false;
        Ok(())
    }
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layout", &self.layout)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = YamlLayoutFile::new(temp_dir.path().join("monitor.yaml"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("monitor.yaml");

        let mut store = LayoutStore::open_yaml(&path).unwrap();
        *store.entry_or_insert("light", "l_ball_save") = DevicePlacement {
            shape: Some("ARROW".to_string()),
            rotation: Some(90),
            ..DevicePlacement::at(0.25, 0.75)
        };
        assert!(store.is_dirty());
        store.save().unwrap();
        assert!(!store.is_dirty());
        assert!(!path.with_extension("yaml.tmp").exists());

        let reloaded = YamlLayoutFile::new(&path).load().unwrap();
        let entry = reloaded.entry("light", "l_ball_save").unwrap();
        assert_eq!(entry.position(), Some((0.25, 0.75)));
        assert_eq!(entry.shape.as_deref(), Some("ARROW"));
        assert_eq!(entry.rotation, Some(90));
        assert_eq!(entry.size, None);
    }

    #[test]
    fn test_yaml_partial_entries_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("monitor.yaml");
        fs::write(
            &path,
            "switch:\n  s_left_flipper:\n    x: 0.3\n    y: 0.8\n    size: 0.05\n  s_unplaced:\n    x: 0.1\n",
        )
        .unwrap();

        let layout = YamlLayoutFile::new(&path).load().unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.entry("switch", "s_left_flipper").unwrap().size, Some(0.05));
        assert_eq!(layout.entry("switch", "s_unplaced").unwrap().position(), None);
    }

    #[test]
    fn test_yaml_invalid_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("monitor.yaml");
        fs::write(&path, "switch: [not, a, map").unwrap();
        assert!(YamlLayoutFile::new(&path).load().is_err());
    }

    #[test]
    fn test_memory_sink_counts_flushes() {
        let sink = MemorySink::new();
        let mut store = LayoutStore::new(PlayfieldLayout::new(), sink.clone());
        store.entry_or_insert("light", "l_a").x = Some(0.5);
        store.save().unwrap();
        store.save().unwrap();

        assert_eq!(sink.flush_count(), 2);
        assert_eq!(sink.last().unwrap().entry("light", "l_a").unwrap().x, Some(0.5));
    }

    #[test]
    fn test_remove_missing_entry_is_clean() {
        let mut store = LayoutStore::in_memory(PlayfieldLayout::new());
        assert!(store.remove("light", "nope").is_none());
        assert!(!store.is_dirty());
    }
}
