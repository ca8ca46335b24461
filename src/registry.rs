// src/registry.rs

//! Registry of active watches.
//!
//! The registry remembers which paths are being watched, under which
//! channel-issued id, and with which interest mask. Ids come from the
//! channel; the registry never invents them.
//!
//! Removing a watch always purges the router's subscriptions for that id,
//! whether or not the channel accepted the removal. The channel is free to
//! hand the same id out again later, and a stale subscription must never
//! fire for a new watch.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::channel::NotifyChannel;
use crate::errors::{InwatchError, Result};
use crate::router::DispatchRouter;
use crate::types::{EventMask, WatchId};

/// A registered watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    pub id: WatchId,
    pub path: PathBuf,
    /// Interest mask last passed to `add_watch` for this path.
    pub mask: EventMask,
}

/// Watches in registration order.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    watches: Vec<Watch>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` with the channel, or update its mask if it is already
    /// registered.
    ///
    /// Re-registering replaces the stored mask (no merge) and returns the
    /// existing id. On channel failure the registry is left untouched.
    ///
    /// If the channel hands out a new id for a path the registry already
    /// knows (the old watch was dropped by the kernel), the path's
    /// subscriptions move to the new id so none stay keyed to the dead one.
    pub fn add_watch<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        path: impl AsRef<Path>,
        mask: EventMask,
    ) -> Result<WatchId>
    where
        C: NotifyChannel + ?Sized,
    {
        let path = path.as_ref();
        let id = channel
            .add_watch(path, mask)
            .map_err(|source| InwatchError::WatchRegistration {
                path: path.to_path_buf(),
                source,
            })?;

        // The kernel returns the same id for a second path that resolves to
        // an already watched inode; that entry is updated in place too.
        if let Some(existing) = self.watches.iter_mut().find(|w| w.id == id) {
            debug!(%id, path = ?existing.path, old = %existing.mask, new = %mask, "updated watch mask");
            existing.mask = mask;
            return Ok(id);
        }

        if let Some(existing) = self.watches.iter_mut().find(|w| w.path == path) {
            let old_id = existing.id;
            warn!(
                path = ?path,
                %old_id,
                new_id = %id,
                "path re-registered under a new id; moving its subscriptions"
            );
            existing.id = id;
            existing.mask = mask;
            router.rekey(old_id, id);
            return Ok(id);
        }

        info!(%id, ?path, %mask, "added watch");
        self.watches.push(Watch {
            id,
            path: path.to_path_buf(),
            mask,
        });
        Ok(id)
    }

    /// Remove the watch with the given id.
    ///
    /// Returns `true` only if an entry existed and the channel accepted the
    /// removal. Subscriptions for `id` are dropped in every case.
    pub fn remove_watch<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        id: WatchId,
    ) -> bool
    where
        C: NotifyChannel + ?Sized,
    {
        let removed = match self.watches.iter().position(|w| w.id == id) {
            Some(index) => {
                let watch = self.watches.remove(index);
                release(channel, &watch)
            }
            None => {
                debug!(%id, "remove_watch: no such watch");
                false
            }
        };

        router.detach_all(id);
        removed
    }

    /// Remove the watch registered for `path`. Fails if no entry matches.
    pub fn remove_watch_path<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        path: impl AsRef<Path>,
    ) -> bool
    where
        C: NotifyChannel + ?Sized,
    {
        match self.find(path.as_ref()) {
            Some(id) => self.remove_watch(channel, router, id),
            None => {
                debug!(path = ?path.as_ref(), "remove_watch_path: no such watch");
                false
            }
        }
    }

    pub fn exists(&self, id: WatchId) -> bool {
        self.watches.iter().any(|w| w.id == id)
    }

    pub fn find(&self, path: impl AsRef<Path>) -> Option<WatchId> {
        let path = path.as_ref();
        self.watches.iter().find(|w| w.path == path).map(|w| w.id)
    }

    pub fn get(&self, id: WatchId) -> Option<&Watch> {
        self.watches.iter().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watch> {
        self.watches.iter()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<WatchId> {
        self.watches.iter().map(|w| w.id).collect()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

fn release<C: NotifyChannel + ?Sized>(channel: &mut C, watch: &Watch) -> bool {
    match channel.remove_watch(watch.id) {
        Ok(()) => {
            info!(id = %watch.id, path = ?watch.path, "removed watch");
            true
        }
        Err(source) => {
            let err = InwatchError::WatchRemoval {
                id: watch.id,
                source,
            };
            warn!(path = ?watch.path, error = %err, "channel refused watch removal");
            false
        }
    }
}
