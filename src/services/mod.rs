//! Service layer for persistence.
//!
//! This module contains the services that move playfield state to and from
//! durable storage.

pub mod layout_store;

// Re-export commonly used types
pub use layout_store::{LayoutSink, LayoutStore, MemorySink, YamlLayoutFile};
