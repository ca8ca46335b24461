// src/config/mod.rs

//! Configuration for the `inwatch` binary.
//!
//! - `model.rs`: the TOML data model.
//! - `loader.rs`: reading a file from disk.
//! - `validate.rs`: turning a raw file into a checked [`ConfigFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, locate_config};
pub use model::{ConfigFile, EngineSection, RawConfigFile, WatchConfig, WatchSpec};
pub use validate::validate_config;
