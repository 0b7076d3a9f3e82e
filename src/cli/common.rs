//! Shared plumbing for CLI commands.

use std::path::PathBuf;
use std::rc::Rc;

use serde_json::{json, Map};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::{DeviceKind, DeviceRegistry, DeviceState, DeviceStates, PlayfieldLayout};
use crate::playfield::{
    CommandLog, InspectorLog, PlayfieldContext, PlayfieldSurface, PlayfieldView, ViewHost,
};
use crate::services::LayoutStore;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Bad arguments or a request the layout cannot satisfy
    ValidationError = 1,
    /// Reading or writing a file failed
    IoError = 2,
}

/// CLI command failure.
#[derive(Debug, Error)]
pub enum CliError {
    /// The request was rejected
    #[error("{0}")]
    Validation(String),
    /// Persistence failed
    #[error("{0}")]
    Io(String),
}

impl CliError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Validation(_) => ExitCode::ValidationError,
            Self::Io(_) => ExitCode::IoError,
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Global options every command receives.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit config file; `None` uses the platform location
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Path of the config file in use.
    pub fn config_path(&self) -> CliResult<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path()
                .map_err(|e| CliError::io(format!("Failed to locate config: {e:#}"))),
        }
    }
}

/// Loaded configuration plus a playfield surface replayed from the layout.
///
/// Without a running machine the registry is built from the layout itself:
/// lights start dark and switches inactive.
pub struct Session {
    /// Configuration in use
    pub config: Config,
    /// Config file the session writes settings back to
    pub config_path: PathBuf,
    /// Surface with every placed widget
    pub surface: PlayfieldSurface,
    /// Offline device registry
    pub registry: DeviceStates,
    /// Commands widgets sent during this session
    pub commands: CommandLog,
}

impl Session {
    /// Loads the config and layout and replays every placed widget.
    pub fn open(options: &GlobalOptions) -> CliResult<Self> {
        let config_path = options.config_path()?;
        let config = Config::load_from(&config_path)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        let layout_path = config
            .layout_file_path()
            .map_err(|e| CliError::io(format!("Failed to locate layout file: {e:#}")))?;
        let store = LayoutStore::open_yaml(&layout_path)
            .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;
        debug!(path = %layout_path.display(), "layout loaded");

        let registry = offline_registry(store.layout());
        let commands = CommandLog::new();
        let context = PlayfieldContext::new(
            config.scene_size(),
            store,
            commands.clone(),
            InspectorLog::new(),
        )
        .with_default_device_size(config.playfield.device_size);
        context.set_inspector_enabled(config.playfield.inspector_enabled);

        let surface = PlayfieldSurface::new(Rc::new(context));
        let created = surface
            .replay_config(&registry)
            .map_err(|e| CliError::io(format!("Failed to replay layout: {e:#}")))?;
        debug!(created, "widgets replayed");

        Ok(Self {
            config,
            config_path,
            surface,
            registry,
            commands,
        })
    }

    /// Makes sure the registry knows a device, adding an offline state if not.
    pub fn ensure_device(&mut self, device_type: &str, name: &str) {
        if self.registry.device_state(device_type, name).is_none() {
            self.registry.insert(offline_device(device_type, name));
        }
    }

    /// Wraps the surface in a view whose settings go back to the config file.
    pub fn into_view(self) -> PlayfieldView {
        let host = ConfigHost {
            config: self.config,
            config_path: self.config_path,
            context: Rc::clone(self.surface.context()),
        };
        PlayfieldView::new(self.surface, host)
    }
}

/// Registry holding one offline state per device in the layout.
pub fn offline_registry(layout: &PlayfieldLayout) -> DeviceStates {
    let mut registry = DeviceStates::new();
    for (device_type, name, _) in layout.iter() {
        registry.insert(offline_device(device_type, name));
    }
    registry
}

fn offline_device(device_type: &str, name: &str) -> DeviceState {
    let mut data = Map::new();
    match DeviceKind::from_type(device_type) {
        Some(DeviceKind::Light) => {
            data.insert("color".to_string(), json!([0, 0, 0]));
        }
        Some(DeviceKind::Switch) => {
            data.insert("state".to_string(), json!(false));
        }
        None => {}
    }
    DeviceState::new(device_type, name, data)
}

/// View host that writes the playfield settings into the config file.
struct ConfigHost {
    config: Config,
    config_path: PathBuf,
    context: Rc<PlayfieldContext>,
}

impl ViewHost for ConfigHost {
    fn write_local_settings(&self) -> anyhow::Result<()> {
        let mut config = self.config.clone();
        config.playfield.inspector_enabled = self.context.inspector_enabled();
        config.playfield.device_size = self.context.default_device_size();
        config.save_to(&self.config_path)
    }

    fn check_if_quit(&self) {
        debug!("playfield view closed");
    }
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_dimensions(value: &str) -> Result<(f64, f64), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f64 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{width}'"))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{height}'"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("dimensions must be positive, got '{value}'"));
    }
    Ok((width, height))
}
