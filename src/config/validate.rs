// src/config/validate.rs

use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::model::{ConfigFile, RawConfigFile, WatchConfig, WatchSpec};
use crate::errors::{InwatchError, Result};
use crate::types::EventMask;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = InwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_watches(&raw)?;
        validate_engine(&raw)?;
        let watches = resolve_watches(&raw.watch)?;
        Ok(ConfigFile::new_unchecked(raw.engine, watches))
    }
}

/// Validate a raw config without keeping the result.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ConfigFile::try_from(cfg.clone()).map(|_| ())
}

fn ensure_has_watches(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.is_empty() {
        return Err(InwatchError::ConfigError(
            "config must contain at least one [[watch]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.poll_timeout_ms < 0 {
        return Err(InwatchError::ConfigError(format!(
            "[engine].poll_timeout_ms must be >= 0 (got {})",
            cfg.engine.poll_timeout_ms
        )));
    }
    Ok(())
}

fn resolve_watches(entries: &[WatchConfig]) -> Result<Vec<WatchSpec>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut specs = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.path.trim().is_empty() {
            return Err(InwatchError::ConfigError(
                "[[watch]] entry has an empty `path`".to_string(),
            ));
        }
        if entry.events.is_empty() {
            return Err(InwatchError::ConfigError(format!(
                "watch '{}' has an empty `events` list",
                entry.path
            )));
        }

        let mut mask = EventMask::empty();
        for name in &entry.events {
            let bit = name.parse::<EventMask>().map_err(|e| {
                InwatchError::ConfigError(format!("watch '{}': {e}", entry.path))
            })?;
            mask |= bit;
        }

        let path = PathBuf::from(&entry.path);
        if !seen.insert(path.clone()) {
            return Err(InwatchError::ConfigError(format!(
                "watch '{}' is listed more than once",
                entry.path
            )));
        }

        specs.push(WatchSpec { path, mask });
    }

    Ok(specs)
}
