//! End-to-end tests for the `mpf-playfield` commands.

use std::path::Path;
use std::process::{Command, Output};

use mpf_playfield::config::Config;
use mpf_playfield::models::{DevicePlacement, PlayfieldLayout};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

/// Runs the binary with an isolated config directory and an explicit config file.
fn run(config_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mpf-playfield"))
        .env("MPF_PLAYFIELD_CONFIG_DIR", config_path.parent().unwrap())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (config_path, layout_path) = write_config(temp_dir.path());
    (temp_dir, config_path, layout_path)
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_empty_layout() {
    let (_temp_dir, config_path, _layout_path) = setup();

    let output = run(&config_path, &["list"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No widgets placed."));
}

#[test]
fn test_list_json() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["list", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let widgets: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Should parse JSON output");
    let widgets = widgets.as_array().expect("Should be an array");

    // Every placed entry is replayed offline; the unplaced switch is skipped.
    assert_eq!(widgets.len(), 3);

    let light = widgets
        .iter()
        .find(|w| w["name"] == "l_shoot_again")
        .expect("l_shoot_again should be listed");
    assert_eq!(light["device_type"], "light");
    assert_eq!(light["shape"], "ARROW");
    assert_eq!(light["rotation"], 90);
    assert_eq!(light["position"]["x"], 500.0);
    assert_eq!(light["position"]["y"], 500.0);
    assert!(light.get("viewport_position").is_none());

    let switch = widgets
        .iter()
        .find(|w| w["name"] == "s_start")
        .expect("s_start should be listed");
    assert_eq!(switch["shape"], "SQUARE");
}

#[test]
fn test_list_viewport_positions() {
    let (_temp_dir, config_path, layout_path) = setup();
    let mut layout = PlayfieldLayout::new();
    layout.insert("light", "l_center", DevicePlacement::at(0.5, 0.5));
    write_layout(&layout_path, &layout);

    let output = run(&config_path, &["list", "--json", "--viewport", "500x700"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let widgets: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(widgets[0]["viewport_position"]["x"], 250.0);
    assert_eq!(widgets[0]["viewport_position"]["y"], 350.0);
}

#[test]
fn test_list_reports_unsupported_device() {
    let (_temp_dir, config_path, layout_path) = setup();
    let mut layout = PlayfieldLayout::new();
    layout.insert("coil", "c_trough_eject", DevicePlacement::at(0.5, 0.5));
    write_layout(&layout_path, &layout);

    let output = run(&config_path, &["list", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let widgets: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(widgets[0]["error"]
        .as_str()
        .unwrap()
        .contains("coil"));
}

// ============================================================================
// Place
// ============================================================================

#[test]
fn test_place_writes_layout() {
    let (_temp_dir, config_path, layout_path) = setup();

    let output = run(&config_path, &["place", "light", "l_ball_save", "--x", "0.25", "--y", "0.5"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("light: l_ball_save"));

    let layout = read_layout(&layout_path);
    let entry = layout.entry("light", "l_ball_save").unwrap();
    assert_eq!(entry.position(), Some((0.25, 0.5)));
    assert_eq!(entry.shape, None);
    assert_eq!(entry.rotation, None);
    assert_eq!(entry.size, None);
}

#[test]
fn test_place_with_style() {
    let (_temp_dir, config_path, layout_path) = setup();

    let output = run(
        &config_path,
        &[
            "place", "switch", "s_left_flipper", "--x", "0.3", "--y", "0.8", "--shape", "flipper",
            "--rotation", "-45", "--size", "0.05",
        ],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let layout = read_layout(&layout_path);
    let entry = layout.entry("switch", "s_left_flipper").unwrap();
    assert_eq!(entry.shape.as_deref(), Some("FLIPPER"));
    assert_eq!(entry.rotation, Some(315));
    assert_eq!(entry.size, Some(0.05));
}

#[test]
fn test_place_replaces_existing_entry() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["place", "switch", "s_start", "--x", "0.5", "--y", "0.5"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let layout = read_layout(&layout_path);
    assert_eq!(
        layout.entry("switch", "s_start").unwrap().position(),
        Some((0.5, 0.5))
    );
    assert!(layout.entry("light", "l_shoot_again").is_some());
}

#[test]
fn test_place_rejects_bad_input() {
    let (_temp_dir, config_path, layout_path) = setup();

    let output = run(&config_path, &["place", "coil", "c_a", "--x", "0.5", "--y", "0.5"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unsupported device type"));

    let output = run(&config_path, &["place", "light", "l_a", "--x", "1.5", "--y", "0.5"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(
        &config_path,
        &["place", "light", "l_a", "--x", "0.5", "--y", "0.5", "--shape", "hexagon"],
    );
    assert_eq!(output.status.code(), Some(1));

    assert!(!layout_path.exists(), "nothing should be written");
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn test_remove_deletes_only_that_entry() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["remove", "switch", "s_start"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let layout = read_layout(&layout_path);
    assert!(layout.entry("switch", "s_start").is_none());
    assert!(layout.entry("switch", "s_left_flipper").is_some());
    assert!(layout.entry("light", "l_shoot_again").is_some());
}

#[test]
fn test_remove_unplaced_device_fails() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["remove", "switch", "s_left_flipper"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not placed"));
}

// ============================================================================
// Reset sizes
// ============================================================================

#[test]
fn test_reset_sizes() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["reset-sizes"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let layout = read_layout(&layout_path);
    assert_eq!(layout.entry("light", "l_shoot_again").unwrap().size, Some(0.05));

    let output = run(&config_path, &["reset-sizes", "--force"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let layout = read_layout(&layout_path);
    assert_eq!(layout.entry("light", "l_shoot_again").unwrap().size, None);
    assert_eq!(
        layout.entry("light", "l_shoot_again").unwrap().shape.as_deref(),
        Some("ARROW")
    );
}

#[test]
fn test_reset_sizes_with_new_default() {
    let (_temp_dir, config_path, layout_path) = setup();
    write_layout(&layout_path, &test_layout());

    let output = run(&config_path, &["reset-sizes", "--size", "0.04"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("size 0.04"));

    let config = Config::load_from(&config_path).unwrap();
    assert_eq!(config.playfield.device_size, 0.04);

    // Unpinned sizes follow the new default; pinned ones stay
    let layout = read_layout(&layout_path);
    assert_eq!(layout.entry("switch", "s_start").unwrap().size, None);
    assert_eq!(layout.entry("light", "l_shoot_again").unwrap().size, Some(0.05));

    let output = run(&config_path, &["list", "--json"]);
    let widgets: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let start = widgets
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["name"] == "s_start")
        .unwrap();
    assert_eq!(start["size"], 0.04);
    assert_eq!(start["device_size"], 40.0);
}

#[test]
fn test_reset_sizes_rejects_bad_size() {
    let (_temp_dir, config_path, _layout_path) = setup();

    let output = run(&config_path, &["reset-sizes", "--size", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(Config::load_from(&config_path).unwrap().playfield.device_size, 0.02);
}

// ============================================================================
// Inspector
// ============================================================================

#[test]
fn test_inspector_toggle_persists() {
    let (_temp_dir, config_path, _layout_path) = setup();

    let output = run(&config_path, &["inspector", "on"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Inspector Enabled - Playfield"));
    assert!(Config::load_from(&config_path).unwrap().playfield.inspector_enabled);

    let output = run(&config_path, &["inspector", "off"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(!Config::load_from(&config_path).unwrap().playfield.inspector_enabled);
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[playfield]\ndevice_size = 0.0\n").unwrap();

    let output = run(&config_path, &["list"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Device size"));
}
