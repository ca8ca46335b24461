// src/channel/mod.rs

//! The kernel notification channel, seen from the engine.
//!
//! The engine only needs six things from the channel: open (the
//! implementation's constructor), add and remove a watch, a bounded wait for
//! readability, the exact number of pending bytes, and a single read.
//! Closing happens on `Drop`.
//!
//! [`inotify::InotifyChannel`] talks to Linux inotify through `libc`;
//! [`mock::MockChannel`] is an in-memory stand-in that tests script with
//! encoded records and injected failures.

use std::fmt::Debug;
use std::io;
use std::path::Path;

use crate::types::{EventMask, WatchId};

#[cfg(target_os = "linux")]
pub mod inotify;
pub mod mock;

/// Abstract notification channel.
pub trait NotifyChannel: Send + Debug {
    /// Register `path` (or modify its existing registration) and return the
    /// channel's id for it.
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId>;

    fn remove_watch(&mut self, id: WatchId) -> io::Result<()>;

    /// Wait up to `timeout_ms` for data. Zero checks without blocking, a
    /// negative value waits indefinitely.
    ///
    /// An interrupting signal surfaces as `ErrorKind::Interrupted`; callers
    /// treat it as "not ready yet".
    fn wait_readable(&mut self, timeout_ms: i32) -> io::Result<bool>;

    /// Exact number of bytes a read would return right now.
    fn pending_bytes(&mut self) -> io::Result<usize>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<C: NotifyChannel + ?Sized> NotifyChannel for Box<C> {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId> {
        (**self).add_watch(path, mask)
    }

    fn remove_watch(&mut self, id: WatchId) -> io::Result<()> {
        (**self).remove_watch(id)
    }

    fn wait_readable(&mut self, timeout_ms: i32) -> io::Result<bool> {
        (**self).wait_readable(timeout_ms)
    }

    fn pending_bytes(&mut self) -> io::Result<usize> {
        (**self).pending_bytes()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}
