// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read and deserialize a TOML config file. No semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Read, deserialize and validate a config file.
///
/// Checks that there is at least one watch, that every event name is known,
/// that no path is listed twice and that the poll timeout is usable.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

/// `Inwatch.toml`, relative to the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Inwatch.toml")
}

/// The config file to load: `explicit` if given, otherwise
/// [`default_config_path`] under `dir` when that file exists.
pub fn locate_config(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = dir.join(default_config_path());
            fallback.is_file().then_some(fallback)
        }
    }
}
