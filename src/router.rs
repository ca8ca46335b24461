// src/router.rs

//! Subscription table and event dispatch.
//!
//! A subscription binds `(watch id, mask filter)` to a [`Handler`]. The key
//! is unique: attaching again with the same key replaces the handler.
//!
//! Matching rules for [`DispatchRouter::dispatch`]:
//! - the subscription's watch id equals the event's watch id, and
//! - the filter shares at least one bit with the event mask.
//!
//! Every matching handler runs, in registration order, so a narrow filter
//! and a compound filter covering the same bit both fire for one event. A
//! handler that fails (returns `false`/`Err`, or panics) does not stop the
//! handlers after it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::{InwatchError, Result};
use crate::event::Event;
use crate::handler::Handler;
use crate::registry::WatchRegistry;
use crate::types::{EventMask, HandlerFailurePolicy, WatchId};

/// A single handler failed while processing an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "handler for watch {watch_id} (filter {mask_filter}) failed on {event_mask}: {reason}"
)]
pub struct HandlerFailure {
    pub watch_id: WatchId,
    pub mask_filter: EventMask,
    pub event_mask: EventMask,
    pub reason: String,
    pub panicked: bool,
}

/// What happened during one or more dispatch passes.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of handler invocations, failed ones included.
    pub invoked: usize,
    /// Failures, in invocation order. Always empty under
    /// [`HandlerFailurePolicy::Swallow`].
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the first recorded failure into an error.
    pub fn into_result(self) -> Result<usize> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(InwatchError::HandlerFailure(failure)),
            None => Ok(self.invoked),
        }
    }
}

#[derive(Debug)]
struct Subscription {
    watch_id: WatchId,
    mask_filter: EventMask,
    handler: Handler,
}

impl Subscription {
    fn matches(&self, event: &Event) -> bool {
        self.watch_id == event.watch_id && self.mask_filter.overlaps(event.mask)
    }
}

#[derive(Debug, Default)]
pub struct DispatchRouter {
    subscriptions: Vec<Subscription>,
    policy: HandlerFailurePolicy,
}

impl DispatchRouter {
    pub fn new(policy: HandlerFailurePolicy) -> Self {
        Self {
            subscriptions: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> HandlerFailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: HandlerFailurePolicy) {
        self.policy = policy;
    }

    /// Subscribe `handler` to events on `id` whose mask intersects
    /// `mask_filter`.
    ///
    /// An existing subscription with the same `(id, mask_filter)` is dropped
    /// and the new one goes to the end of the dispatch order.
    pub fn attach(
        &mut self,
        registry: &WatchRegistry,
        id: WatchId,
        mask_filter: EventMask,
        handler: Handler,
    ) -> Result<()> {
        if !registry.exists(id) {
            return Err(InwatchError::UnknownWatch(id));
        }
        if mask_filter.is_empty() {
            return Err(InwatchError::EmptyMaskFilter);
        }

        if self.detach(id, mask_filter) {
            debug!(%id, filter = %mask_filter, "replaced existing subscription");
        }

        self.subscriptions.push(Subscription {
            watch_id: id,
            mask_filter,
            handler,
        });
        debug!(%id, filter = %mask_filter, total = self.subscriptions.len(), "attached handler");
        Ok(())
    }

    /// Remove the subscription with exactly this key.
    pub fn detach(&mut self, id: WatchId, mask_filter: EventMask) -> bool {
        match self
            .subscriptions
            .iter()
            .position(|s| s.watch_id == id && s.mask_filter == mask_filter)
        {
            Some(index) => {
                self.subscriptions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every subscription bound to `id`.
    pub fn detach_all(&mut self, id: WatchId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.watch_id != id);
        let removed = before - self.subscriptions.len();
        if removed > 0 {
            debug!(%id, removed, "detached subscriptions");
        }
        removed > 0
    }

    /// Move every subscription bound to `old` over to `new`, keeping the
    /// dispatch order.
    ///
    /// Subscriptions already bound to `new` are dropped first; `new` was not
    /// registered until now, so they can only be leftovers.
    pub fn rekey(&mut self, old: WatchId, new: WatchId) -> usize {
        if old == new {
            return 0;
        }
        self.detach_all(new);

        let mut moved = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.watch_id == old) {
            sub.watch_id = new;
            moved += 1;
        }
        if moved > 0 {
            debug!(%old, %new, moved, "re-keyed subscriptions");
        }
        moved
    }

    pub fn contains(&self, id: WatchId, mask_filter: EventMask) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.watch_id == id && s.mask_filter == mask_filter)
    }

    /// Filters subscribed on `id`, in dispatch order.
    pub fn subscriptions_for(&self, id: WatchId) -> Vec<EventMask> {
        self.subscriptions
            .iter()
            .filter(|s| s.watch_id == id)
            .map(|s| s.mask_filter)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Run every handler matching `event`, in registration order.
    pub fn dispatch(&mut self, event: &Event) -> DispatchReport {
        let mut report = DispatchReport::default();

        for sub in self.subscriptions.iter_mut().filter(|s| s.matches(event)) {
            report.invoked += 1;

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sub.handler.invoke(event)));
            let (reason, panicked) = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(reason)) => (reason, false),
                Err(payload) => (panic_message(payload.as_ref()), true),
            };

            let failure = HandlerFailure {
                watch_id: sub.watch_id,
                mask_filter: sub.mask_filter,
                event_mask: event.mask,
                reason,
                panicked,
            };

            match self.policy {
                HandlerFailurePolicy::Collect => report.failures.push(failure),
                HandlerFailurePolicy::Swallow => {
                    warn!(error = %failure, "handler failed; continuing")
                }
            }
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
