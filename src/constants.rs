//! Application-wide constants.
//!
//! This module defines the config locations and the tuning values shared
//! by the playfield widgets.

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "MpfPlayfield";

/// Default widget size as a fraction of scene width.
pub const DEFAULT_DEVICE_SIZE: f64 = 0.02;

/// Gamma applied to light colors. Tunable, not physical.
pub const GAMMA: f64 = 0.5;

/// Scale applied after gamma so mid-range values reach full brightness.
pub const GAMMA_SCALE: f64 = 18.0;

/// Pointer moves within this many seconds of a press are treated as part of a click.
pub const DRAG_START_DELAY_SECS: f64 = 0.3;

/// A drag only commits its new position if the press lasted longer than this.
pub const DRAG_COMMIT_DELAY_SECS: f64 = 0.5;

/// Switch command state meaning "invert whatever the switch is now".
pub const TOGGLE_STATE: i32 = -1;

/// Outline width in scene units.
pub const OUTLINE_WIDTH: f64 = 3.0;

/// Window title of the playfield view.
pub const VIEW_TITLE: &str = "Playfield";

/// Window title of the playfield view while the inspector is enabled.
pub const VIEW_TITLE_INSPECTOR: &str = "Inspector Enabled - Playfield";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "MPF_PLAYFIELD_CONFIG_DIR";

/// Layout file name used when the config does not name one.
pub const DEFAULT_LAYOUT_FILE_NAME: &str = "monitor.yaml";

/// Scene width used until a playfield image size is configured.
pub const DEFAULT_SCENE_WIDTH: f64 = 1000.0;

/// Scene height used until a playfield image size is configured.
pub const DEFAULT_SCENE_HEIGHT: f64 = 2000.0;
