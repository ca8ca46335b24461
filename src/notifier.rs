// src/notifier.rs

//! The caller-facing watcher.
//!
//! A [`Notifier`] owns one channel together with the watch registry, the
//! subscription router and the poll engine, and exposes them as a single
//! API. It does no work in the background: nothing happens until the
//! caller polls.

use std::path::Path;
#[cfg(target_os = "linux")]
use std::os::fd::{AsRawFd, RawFd};

use tracing::debug;

#[cfg(target_os = "linux")]
use crate::channel::inotify::InotifyChannel;
use crate::channel::NotifyChannel;
use crate::config::EngineSection;
use crate::engine::{Drained, PollEngine, PollOutcome, PollReport};
use crate::errors::{InwatchError, Result};
use crate::handler::Handler;
use crate::registry::{Watch, WatchRegistry};
use crate::router::DispatchRouter;
use crate::types::{ConsumptionMode, EventMask, HandlerFailurePolicy, InitFlags, WatchId};

/// Behaviour switches for a [`Notifier`].
#[derive(Debug, Clone, Copy)]
pub struct NotifierOptions {
    /// Mode used by [`Notifier::poll`].
    pub mode: ConsumptionMode,
    pub failure_policy: HandlerFailurePolicy,
    pub initial_buffer_bytes: usize,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            mode: ConsumptionMode::default(),
            failure_policy: HandlerFailurePolicy::default(),
            initial_buffer_bytes: crate::engine::DEFAULT_BUFFER_BYTES,
        }
    }
}

impl From<&EngineSection> for NotifierOptions {
    fn from(section: &EngineSection) -> Self {
        Self {
            mode: section.mode,
            failure_policy: section.handler_failures,
            initial_buffer_bytes: section.initial_buffer_bytes,
        }
    }
}

#[derive(Debug)]
pub struct Notifier<C: NotifyChannel> {
    channel: C,
    registry: WatchRegistry,
    router: DispatchRouter,
    engine: PollEngine,
    mode: ConsumptionMode,
}

#[cfg(target_os = "linux")]
impl Notifier<InotifyChannel> {
    /// Open a fresh inotify instance.
    ///
    /// Failing here is fatal for the notifier and is reported as
    /// [`InwatchError::ChannelInit`].
    pub fn open(flags: InitFlags) -> Result<Self> {
        Self::open_with(flags, NotifierOptions::default())
    }

    pub fn open_with(flags: InitFlags, options: NotifierOptions) -> Result<Self> {
        let channel = InotifyChannel::open(flags).map_err(InwatchError::ChannelInit)?;
        Ok(Self::with_options(channel, options))
    }
}

/// Exposes the inotify descriptor, e.g. for an external `select`/`epoll`.
#[cfg(target_os = "linux")]
impl AsRawFd for Notifier<InotifyChannel> {
    fn as_raw_fd(&self) -> RawFd {
        self.channel.as_raw_fd()
    }
}

impl<C: NotifyChannel> Notifier<C> {
    pub fn new(channel: C) -> Self {
        Self::with_options(channel, NotifierOptions::default())
    }

    pub fn with_options(channel: C, options: NotifierOptions) -> Self {
        debug!(?options, "creating notifier");
        Self {
            channel,
            registry: WatchRegistry::new(),
            router: DispatchRouter::new(options.failure_policy),
            engine: PollEngine::with_buffer_capacity(options.initial_buffer_bytes),
            mode: options.mode,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn router(&self) -> &DispatchRouter {
        &self.router
    }

    pub fn engine(&self) -> &PollEngine {
        &self.engine
    }

    pub fn mode(&self) -> ConsumptionMode {
        self.mode
    }

    /// Add a watch, or replace the mask of an existing one.
    ///
    /// When a known path comes back under a new id, its subscriptions follow
    /// it to the new id and events still queued for the old id are dropped.
    pub fn add_watch(&mut self, path: impl AsRef<Path>, mask: EventMask) -> Result<WatchId> {
        let path = path.as_ref();
        let previous = self.registry.find(path);
        let id = self
            .registry
            .add_watch(&mut self.channel, &mut self.router, path, mask)?;

        if let Some(old) = previous.filter(|old| *old != id) {
            self.discard_retained(old);
        }
        Ok(id)
    }

    /// Remove a watch, every subscription bound to it and any of its events
    /// still queued.
    pub fn remove_watch(&mut self, id: WatchId) -> bool {
        let removed = self
            .registry
            .remove_watch(&mut self.channel, &mut self.router, id);
        self.discard_retained(id);
        removed
    }

    /// Path-based [`Notifier::remove_watch`].
    pub fn remove_watch_path(&mut self, path: impl AsRef<Path>) -> bool {
        match self.registry.find(path.as_ref()) {
            Some(id) => self.remove_watch(id),
            None => self
                .registry
                .remove_watch_path(&mut self.channel, &mut self.router, path),
        }
    }

    fn discard_retained(&mut self, id: WatchId) {
        let dropped = self.engine.discard(id);
        if dropped > 0 {
            debug!(%id, dropped, "dropped queued events of a removed watch");
        }
    }

    pub fn exists(&self, id: WatchId) -> bool {
        self.registry.exists(id)
    }

    pub fn find(&self, path: impl AsRef<Path>) -> Option<WatchId> {
        self.registry.find(path)
    }

    pub fn watch(&self, id: WatchId) -> Option<&Watch> {
        self.registry.get(id)
    }

    pub fn attach(&mut self, id: WatchId, mask_filter: EventMask, handler: Handler) -> Result<()> {
        self.router.attach(&self.registry, id, mask_filter, handler)
    }

    pub fn detach(&mut self, id: WatchId, mask_filter: EventMask) -> bool {
        self.router.detach(id, mask_filter)
    }

    pub fn detach_all(&mut self, id: WatchId) -> bool {
        self.router.detach_all(id)
    }

    /// Poll in the configured default mode.
    pub fn poll(&mut self, timeout_ms: i32) -> Result<PollOutcome> {
        match self.mode {
            ConsumptionMode::Dispatch => self.poll_dispatch(timeout_ms).map(PollOutcome::Dispatched),
            ConsumptionMode::Drain => self.poll_drain(timeout_ms).map(PollOutcome::Drained),
        }
    }

    pub fn poll_dispatch(&mut self, timeout_ms: i32) -> Result<PollReport> {
        self.engine
            .dispatch(&mut self.channel, &mut self.router, timeout_ms)
    }

    pub fn poll_drain(&mut self, timeout_ms: i32) -> Result<Drained> {
        self.engine.drain(&mut self.channel, timeout_ms)
    }

    /// Dispatch only `id`'s events; other live watches' events are kept.
    ///
    /// Queued events for ids that are no longer registered (such as the
    /// `IN_IGNORED` that follows a removal) are handed back in
    /// [`PollReport::unrouted`].
    pub fn poll_watch(&mut self, id: WatchId, timeout_ms: i32) -> Result<PollReport> {
        let mut report =
            self.engine
                .dispatch_watch(&mut self.channel, &mut self.router, id, timeout_ms)?;

        let registry = &self.registry;
        let released = self.engine.release_where(|wd| registry.exists(wd));
        report.unrouted.extend(released);
        report.retained = self.engine.retained();
        Ok(report)
    }

    /// Dispatch watch by watch, in registration order.
    pub fn poll_all(&mut self, timeout_ms: i32) -> Result<PollReport> {
        let ids = self.registry.ids();
        self.engine
            .dispatch_each(&mut self.channel, &mut self.router, &ids, timeout_ms)
    }
}
