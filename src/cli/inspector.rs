//! Inspector mode setting.

use crate::cli::common::{CliError, CliResult, GlobalOptions, Session};
use clap::{Args, ValueEnum};

/// Inspector mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectorMode {
    /// Clicks select widgets for inspection
    On,
    /// Clicks send device commands
    Off,
}

/// Turn inspector mode on or off
#[derive(Debug, Clone, Args)]
pub struct InspectorArgs {
    /// New mode
    #[arg(value_enum)]
    pub mode: InspectorMode,
}

impl InspectorArgs {
    /// Execute the inspector command
    pub fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        let mut view = Session::open(options)?.into_view();
        view.set_inspector_enabled(self.mode == InspectorMode::On);

        view.close()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("{}", view.title());
        Ok(())
    }
}
