//! CLI command handlers.
//!
//! Headless access to the playfield layout: every command loads the config
//! and layout, replays the placed widgets, and works through the same
//! surface and widget operations the interactive view uses.

pub mod common;
pub mod inspector;
pub mod list;
pub mod place;
pub mod remove;
pub mod reset_sizes;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode, GlobalOptions, Session};
pub use inspector::InspectorArgs;
pub use list::ListArgs;
pub use place::PlaceArgs;
pub use remove::RemoveArgs;
pub use reset_sizes::ResetSizesArgs;
