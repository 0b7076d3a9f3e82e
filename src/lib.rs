//! MPF Playfield Library
//!
//! Interactive playfield layer for a pinball machine monitor: device widgets
//! placed on an image of the playfield, drawn from live device state, and
//! persisted as normalized positions in a YAML layout file.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod playfield;
pub mod services;
