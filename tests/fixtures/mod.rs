//! Shared test fixtures for playfield and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use mpf_playfield::config::Config;
use mpf_playfield::models::{DevicePlacement, DeviceState, DeviceStates, PlayfieldLayout, SceneSize};
use mpf_playfield::playfield::{CommandLog, InspectorLog, PlayfieldContext, PlayfieldSurface};
use mpf_playfield::services::{LayoutSink, LayoutStore, MemorySink, YamlLayoutFile};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Surface over an in-memory layout, with every hook recorded.
pub struct TestPlayfield {
    pub surface: PlayfieldSurface,
    pub sink: MemorySink,
    pub commands: CommandLog,
    pub inspector: InspectorLog,
    pub registry: DeviceStates,
}

/// Creates a 1000x1000 playfield over `layout` with the default device size.
pub fn test_playfield(layout: PlayfieldLayout, registry: DeviceStates) -> TestPlayfield {
    let sink = MemorySink::new();
    let commands = CommandLog::new();
    let inspector = InspectorLog::new();
    let context = PlayfieldContext::new(
        SceneSize::new(1000.0, 1000.0),
        LayoutStore::new(layout, sink.clone()),
        commands.clone(),
        inspector.clone(),
    );

    TestPlayfield {
        surface: PlayfieldSurface::new(Rc::new(context)),
        sink,
        commands,
        inspector,
        registry,
    }
}

fn device(device_type: &str, name: &str, data: Value) -> DeviceState {
    let data = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    DeviceState::new(device_type, name, data)
}

/// Light with an `[r, g, b]` color.
pub fn light(name: &str, color: [u8; 3]) -> DeviceState {
    device("light", name, json!({ "color": color }))
}

/// Switch with the given state.
pub fn switch(name: &str, active: bool) -> DeviceState {
    device("switch", name, json!({ "state": active }))
}

/// A device type the playfield cannot draw.
pub fn coil(name: &str) -> DeviceState {
    device("coil", name, json!({ "state": false }))
}

/// Registry with two lights, two switches and a coil.
pub fn test_registry() -> DeviceStates {
    let mut registry = DeviceStates::new();
    registry.insert(light("l_shoot_again", [0, 128, 255]));
    registry.insert(light("l_ball_save", [255, 0, 0]));
    registry.insert(switch("s_start", false));
    registry.insert(switch("s_left_flipper", true));
    registry.insert(coil("c_flipper_main"));
    registry
}

/// Layout with placed, styled, unplaced and unknown entries.
pub fn test_layout() -> PlayfieldLayout {
    let mut layout = PlayfieldLayout::new();
    layout.insert(
        "light",
        "l_shoot_again",
        DevicePlacement {
            shape: Some("ARROW".to_string()),
            rotation: Some(90),
            size: Some(0.05),
            ..DevicePlacement::at(0.5, 0.5)
        },
    );
    layout.insert("switch", "s_start", DevicePlacement::at(0.25, 0.75));
    layout.insert(
        "switch",
        "s_left_flipper",
        DevicePlacement {
            x: Some(0.1),
            ..DevicePlacement::default()
        },
    );
    layout.insert("light", "l_not_on_this_machine", DevicePlacement::at(0.9, 0.9));
    layout
}

/// Writes `layout` to a YAML file.
pub fn write_layout(path: &Path, layout: &PlayfieldLayout) {
    YamlLayoutFile::new(path)
        .flush(layout)
        .expect("Failed to write layout");
}

/// Reads a YAML layout file.
pub fn read_layout(path: &Path) -> PlayfieldLayout {
    YamlLayoutFile::new(path)
        .load()
        .expect("Failed to read layout")
}

/// Writes a config in `dir` pointing at `layout.yaml` next to it.
/// Returns `(config_path, layout_path)`.
pub fn write_config(dir: &Path) -> (PathBuf, PathBuf) {
    let layout_path = dir.join("layout.yaml");
    let config_path = dir.join("config.toml");

    let mut config = Config::new();
    config.paths.layout_file = Some(layout_path.clone());
    config.playfield.scene_width = 1000.0;
    config.playfield.scene_height = 1000.0;
    config.save_to(&config_path).expect("Failed to write config");

    (config_path, layout_path)
}
