//! Remove a device from the playfield.

use crate::cli::common::{CliError, CliResult, GlobalOptions, Session};
use clap::Args;

/// Remove a placed device and delete its layout entry
#[derive(Debug, Clone, Args)]
pub struct RemoveArgs {
    /// Device type
    pub device_type: String,

    /// Device name
    pub name: String,
}

impl RemoveArgs {
    /// Execute the remove command
    pub fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        let mut session = Session::open(options)?;

        let Some(widget) = session.surface.find(&self.device_type, &self.name) else {
            return Err(CliError::validation(format!(
                "{}: {} is not placed on the playfield",
                self.device_type, self.name
            )));
        };

        // Removing the device retires its widget, which drops the layout entry.
        session.registry.remove(&self.device_type, &self.name);

        if !widget.borrow().is_destroyed() {
            widget
                .borrow()
                .destroy()
                .map_err(|e| CliError::io(format!("Failed to save layout: {e:#}")))?;
        }

        if session
            .surface
            .context()
            .store()
            .entry(&self.device_type, &self.name)
            .is_some()
        {
            return Err(CliError::io(format!(
                "Failed to remove {}: {} from the layout",
                self.device_type, self.name
            )));
        }

        println!("Removed {}: {}", self.device_type, self.name);
        Ok(())
    }
}
