// src/channel/mock.rs

use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::NotifyChannel;
use crate::decode::encode;
use crate::event::Event;
use crate::types::{EventMask, WatchId};

#[derive(Debug)]
struct MockState {
    next_id: i32,
    watches: HashMap<PathBuf, (WatchId, EventMask)>,
    links: HashMap<PathBuf, PathBuf>,
    pending: Vec<u8>,
    removed: Vec<WatchId>,
    fail_add: Option<ErrorKind>,
    fail_remove: Option<ErrorKind>,
    fail_wait: Option<ErrorKind>,
    fail_read: Option<ErrorKind>,
    read_calls: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_id: 1,
            watches: HashMap::new(),
            links: HashMap::new(),
            pending: Vec::new(),
            removed: Vec::new(),
            fail_add: None,
            fail_remove: None,
            fail_wait: None,
            fail_read: None,
            read_calls: 0,
        }
    }
}

/// In-memory notification channel.
///
/// Clones share state, so a test can keep one handle to script records and
/// failures while the engine owns another. Ids are issued sequentially from
/// 1 (or from [`MockChannel::with_first_id`]); re-adding a known path returns
/// its existing id like the kernel does. Injected failures fire once.
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start issuing ids at `first`.
    pub fn with_first_id(first: i32) -> Self {
        let channel = Self::default();
        channel.state().next_id = first;
        channel
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the wire form of `event` for the next read.
    pub fn push_event(&self, event: &Event) {
        encode(event, &mut self.state().pending);
    }

    /// Queue raw bytes (e.g. a deliberately truncated record).
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.state().pending.extend_from_slice(bytes);
    }

    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    /// Ids passed to a successful `remove_watch`, in call order.
    pub fn removed_ids(&self) -> Vec<WatchId> {
        self.state().removed.clone()
    }

    /// Mask the channel currently holds for `path`.
    pub fn channel_mask(&self, path: impl AsRef<Path>) -> Option<EventMask> {
        self.state().watches.get(path.as_ref()).map(|(_, mask)| *mask)
    }

    /// Make `alias` resolve to the same watched object as `target`, the
    /// way two hard links share an inode.
    pub fn link(&self, alias: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.state().links.insert(
            alias.as_ref().to_path_buf(),
            target.as_ref().to_path_buf(),
        );
    }

    /// Drop a watch on the channel side and queue its `IN_IGNORED`, as the
    /// kernel does when the watched object goes away.
    pub fn expire_watch(&self, id: WatchId) -> bool {
        let mut state = self.state();
        let before = state.watches.len();
        state.watches.retain(|_, (wd, _)| *wd != id);
        if state.watches.len() == before {
            return false;
        }
        encode(
            &Event::new(id, EventMask::IGNORED, 0, ""),
            &mut state.pending,
        );
        true
    }

    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    pub fn fail_next_add(&self, kind: ErrorKind) {
        self.state().fail_add = Some(kind);
    }

    pub fn fail_next_remove(&self, kind: ErrorKind) {
        self.state().fail_remove = Some(kind);
    }

    pub fn fail_next_wait(&self, kind: ErrorKind) {
        self.state().fail_wait = Some(kind);
    }

    pub fn fail_next_read(&self, kind: ErrorKind) {
        self.state().fail_read = Some(kind);
    }
}

impl NotifyChannel for MockChannel {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId> {
        let mut state = self.state();
        if let Some(kind) = state.fail_add.take() {
            return Err(io::Error::new(kind, "injected add_watch failure"));
        }

        let key = state
            .links
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_path_buf());

        if let Some((id, stored)) = state.watches.get_mut(&key) {
            *stored = if mask.contains(EventMask::MASK_ADD) {
                *stored | mask
            } else {
                mask
            };
            return Ok(*id);
        }

        let id = WatchId(state.next_id);
        state.next_id += 1;
        state.watches.insert(key, (id, mask));
        Ok(id)
    }

    fn remove_watch(&mut self, id: WatchId) -> io::Result<()> {
        let mut state = self.state();
        if let Some(kind) = state.fail_remove.take() {
            return Err(io::Error::new(kind, "injected remove_watch failure"));
        }

        let before = state.watches.len();
        state.watches.retain(|_, (wd, _)| *wd != id);
        if state.watches.len() == before {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("no such watch descriptor {id}"),
            ));
        }
        state.removed.push(id);
        Ok(())
    }

    fn wait_readable(&mut self, _timeout_ms: i32) -> io::Result<bool> {
        let mut state = self.state();
        if let Some(kind) = state.fail_wait.take() {
            return Err(io::Error::new(kind, "injected wait failure"));
        }
        Ok(!state.pending.is_empty())
    }

    fn pending_bytes(&mut self) -> io::Result<usize> {
        Ok(self.state().pending.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        state.read_calls += 1;
        if let Some(kind) = state.fail_read.take() {
            return Err(io::Error::new(kind, "injected read failure"));
        }

        let n = buf.len().min(state.pending.len());
        buf[..n].copy_from_slice(&state.pending[..n]);
        state.pending.drain(..n);
        Ok(n)
    }
}
