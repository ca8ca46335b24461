#![allow(dead_code)]

use inwatch::config::{ConfigFile, EngineSection, RawConfigFile, WatchConfig};
use inwatch::decode::encode;
use inwatch::{ConsumptionMode, Event, EventMask, HandlerFailurePolicy};

/// Builder for raw record streams, as the channel would return them.
pub struct RecordStreamBuilder {
    bytes: Vec<u8>,
    events: Vec<Event>,
}

impl RecordStreamBuilder {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn record(mut self, wd: i32, mask: EventMask, cookie: u32, name: &str) -> Self {
        let event = Event::new(wd, mask, cookie, name);
        encode(&event, &mut self.bytes);
        self.events.push(event);
        self
    }

    /// Append raw bytes, e.g. the first half of a record.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Drop the last `n` bytes of the stream.
    pub fn chop(mut self, n: usize) -> Self {
        let len = self.bytes.len().saturating_sub(n);
        self.bytes.truncate(len);
        self
    }

    /// Events the complete records encode, in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for RecordStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection::default(),
                watch: Vec::new(),
            },
        }
    }

    pub fn with_watch(mut self, path: &str, events: &[&str]) -> Self {
        self.config.watch.push(WatchConfig {
            path: path.to_string(),
            events: events.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn with_mode(mut self, mode: ConsumptionMode) -> Self {
        self.config.engine.mode = mode;
        self
    }

    pub fn with_failure_policy(mut self, policy: HandlerFailurePolicy) -> Self {
        self.config.engine.handler_failures = policy;
        self
    }

    pub fn with_poll_timeout_ms(mut self, ms: i32) -> Self {
        self.config.engine.poll_timeout_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
