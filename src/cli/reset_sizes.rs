//! Reset widget sizes.

use crate::cli::common::{CliError, CliResult, GlobalOptions, Session};
use clap::Args;

/// Reset every widget to the default device size
#[derive(Debug, Clone, Args)]
pub struct ResetSizesArgs {
    /// Also reset widgets whose size was set explicitly
    #[arg(long)]
    pub force: bool,

    /// New default size as a fraction of the playfield width, saved to the config
    #[arg(long)]
    pub size: Option<f64>,
}

impl ResetSizesArgs {
    /// Execute the reset-sizes command
    pub fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        if let Some(size) = self.size {
            if !(size > 0.0 && size <= 1.0) {
                return Err(CliError::validation(format!(
                    "size must be in (0, 1], got {size}"
                )));
            }
        }

        let view = Session::open(options)?.into_view();
        let surface = view.surface();

        if let Some(size) = self.size {
            surface.context().set_default_device_size(size);
        }

        surface
            .reset_all_sizes(self.force)
            .map_err(|e| CliError::io(format!("Failed to save layout: {e:#}")))?;

        if self.size.is_some() {
            view.close()
                .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;
        }

        println!(
            "Reset {} widget(s) to size {}{}",
            surface.widget_count(),
            surface.context().default_device_size(),
            if self.force { "" } else { " (explicit sizes kept)" }
        );
        Ok(())
    }
}
