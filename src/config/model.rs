// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ConsumptionMode, EventMask, HandlerFailurePolicy, InitFlags};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// poll_timeout_ms = 100
/// handler_failures = "collect"
/// mode = "dispatch"
///
/// [[watch]]
/// path = "/tmp/inbox"
/// events = ["create", "delete"]
/// ```
///
/// `[engine]` is optional and every field in it has a default.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    /// `[[watch]]` entries, in file order.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Open the channel with `IN_NONBLOCK`.
    #[serde(default)]
    pub nonblocking: bool,

    /// Open the channel with `IN_CLOEXEC`.
    #[serde(default = "default_close_on_exec")]
    pub close_on_exec: bool,

    /// How long one poll waits for data. Must be >= 0 so the watch loop
    /// wakes up regularly to check for shutdown.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: i32,

    /// Read buffer size before the first grow.
    #[serde(default = "default_initial_buffer_bytes")]
    pub initial_buffer_bytes: usize,

    /// `"collect"` (default) or `"swallow"`.
    #[serde(default)]
    pub handler_failures: HandlerFailurePolicy,

    /// `"dispatch"` (default) or `"drain"`.
    #[serde(default)]
    pub mode: ConsumptionMode,
}

fn default_close_on_exec() -> bool {
    true
}

fn default_poll_timeout_ms() -> i32 {
    100
}

fn default_initial_buffer_bytes() -> usize {
    crate::engine::DEFAULT_BUFFER_BYTES
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            nonblocking: false,
            close_on_exec: default_close_on_exec(),
            poll_timeout_ms: default_poll_timeout_ms(),
            initial_buffer_bytes: default_initial_buffer_bytes(),
            handler_failures: HandlerFailurePolicy::default(),
            mode: ConsumptionMode::default(),
        }
    }
}

impl EngineSection {
    pub fn init_flags(&self) -> InitFlags {
        let mut flags = InitFlags::empty();
        if self.nonblocking {
            flags |= InitFlags::NONBLOCK;
        }
        if self.close_on_exec {
            flags |= InitFlags::CLOEXEC;
        }
        flags
    }
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub path: String,

    /// Event names such as `"create"`, `"close_write"` or `"IN_DELETE"`.
    pub events: Vec<String>,
}

/// A validated watch: a path and the parsed interest mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSpec {
    pub path: PathBuf,
    pub mask: EventMask,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub watches: Vec<WatchSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, watches: Vec<WatchSpec>) -> Self {
        Self { engine, watches }
    }
}
