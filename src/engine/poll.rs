// src/engine/poll.rs

use std::collections::VecDeque;
use std::io::ErrorKind;

use tracing::{debug, warn};

use crate::channel::NotifyChannel;
use crate::decode::{decode, TruncatedRecord};
use crate::engine::{Drained, PollReport, ReadBuffer, DEFAULT_BUFFER_BYTES};
use crate::errors::{InwatchError, Result};
use crate::event::Event;
use crate::router::DispatchRouter;
use crate::types::WatchId;

/// What one channel cycle produced.
#[derive(Debug, Default)]
struct Cycle {
    bytes_read: usize,
    events: Vec<Event>,
    truncated: Option<TruncatedRecord>,
}

/// Owns the read buffer and the queue of retained events.
///
/// Every operation takes `&mut self`; one engine serves one caller at a
/// time.
#[derive(Debug)]
pub struct PollEngine {
    buffer: ReadBuffer,
    retained: VecDeque<Event>,
}

impl Default for PollEngine {
    fn default() -> Self {
        Self::with_buffer_capacity(DEFAULT_BUFFER_BYTES)
    }
}

impl PollEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_capacity(capacity: usize) -> Self {
        Self {
            buffer: ReadBuffer::with_capacity(capacity),
            retained: VecDeque::new(),
        }
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of decoded events waiting for a targeted or draining call.
    pub fn retained(&self) -> usize {
        self.retained.len()
    }

    /// Retained events plus this cycle's events, in order. Nothing is
    /// dispatched.
    pub fn drain<C>(&mut self, channel: &mut C, timeout_ms: i32) -> Result<Drained>
    where
        C: NotifyChannel + ?Sized,
    {
        let cycle = self.cycle(channel, timeout_ms)?;

        let mut events: Vec<Event> = self.retained.drain(..).collect();
        events.extend(cycle.events);

        Ok(Drained {
            bytes_read: cycle.bytes_read,
            events,
            truncated: cycle.truncated,
        })
    }

    /// Dispatch retained events and then this cycle's events, in order.
    /// Overflow markers land in [`PollReport::unrouted`] instead.
    pub fn dispatch<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        timeout_ms: i32,
    ) -> Result<PollReport>
    where
        C: NotifyChannel + ?Sized,
    {
        let cycle = self.cycle(channel, timeout_ms)?;
        let mut report = PollReport {
            bytes_read: cycle.bytes_read,
            truncated: cycle.truncated,
            ..PollReport::default()
        };

        let queued: Vec<Event> = self.retained.drain(..).collect();
        for event in queued.into_iter().chain(cycle.events) {
            if is_unroutable(&event) {
                report.unrouted.push(event);
                continue;
            }
            report.dispatch.merge(router.dispatch(&event));
            report.dispatched += 1;
        }

        Ok(report)
    }

    /// Dispatch only events for `id`; events for other watches stay queued.
    ///
    /// Overflow markers are handed back in the report rather than queued.
    pub fn dispatch_watch<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        id: WatchId,
        timeout_ms: i32,
    ) -> Result<PollReport>
    where
        C: NotifyChannel + ?Sized,
    {
        let cycle = self.cycle(channel, timeout_ms)?;
        let mut report = PollReport {
            bytes_read: cycle.bytes_read,
            truncated: cycle.truncated,
            ..PollReport::default()
        };
        self.queue(cycle.events, &mut report);

        self.dispatch_retained(router, id, &mut report);
        report.retained = self.retained.len();

        Ok(report)
    }

    /// One cycle, then a targeted pass for each id in the given order.
    ///
    /// `ids` is taken to be every live watch: events for any other id,
    /// retained ones included, are handed back in the report and the queue
    /// ends up empty.
    pub fn dispatch_each<C>(
        &mut self,
        channel: &mut C,
        router: &mut DispatchRouter,
        ids: &[WatchId],
        timeout_ms: i32,
    ) -> Result<PollReport>
    where
        C: NotifyChannel + ?Sized,
    {
        let cycle = self.cycle(channel, timeout_ms)?;
        let mut report = PollReport {
            bytes_read: cycle.bytes_read,
            truncated: cycle.truncated,
            ..PollReport::default()
        };
        self.queue(cycle.events, &mut report);

        for &id in ids {
            self.dispatch_retained(router, id, &mut report);
        }
        report.unrouted.extend(self.retained.drain(..));
        if !report.unrouted.is_empty() {
            debug!(count = report.unrouted.len(), "events without a live watch");
        }
        report.retained = 0;

        Ok(report)
    }

    /// Drop retained events for `id`, e.g. after its watch was removed.
    /// Returns how many were dropped.
    pub fn discard(&mut self, id: WatchId) -> usize {
        let before = self.retained.len();
        self.retained.retain(|event| event.watch_id != id);
        before - self.retained.len()
    }

    /// Take every retained event whose id fails `is_live`.
    pub fn release_where<F>(&mut self, mut is_live: F) -> Vec<Event>
    where
        F: FnMut(WatchId) -> bool,
    {
        let (keep, released): (VecDeque<Event>, VecDeque<Event>) = self
            .retained
            .drain(..)
            .partition(|event| is_live(event.watch_id));
        self.retained = keep;
        released.into()
    }

    fn queue(&mut self, events: Vec<Event>, report: &mut PollReport) {
        for event in events {
            if is_unroutable(&event) {
                report.unrouted.push(event);
            } else {
                self.retained.push_back(event);
            }
        }
    }

    fn dispatch_retained(&mut self, router: &mut DispatchRouter, id: WatchId, report: &mut PollReport) {
        let queued = std::mem::take(&mut self.retained);
        for event in queued {
            if event.watch_id == id {
                report.dispatch.merge(router.dispatch(&event));
                report.dispatched += 1;
            } else {
                self.retained.push_back(event);
            }
        }
    }

    fn cycle<C>(&mut self, channel: &mut C, timeout_ms: i32) -> Result<Cycle>
    where
        C: NotifyChannel + ?Sized,
    {
        let ready = match channel.wait_readable(timeout_ms) {
            Ok(ready) => ready,
            Err(err) if err.kind() == ErrorKind::Interrupted => {
                debug!("readiness wait interrupted by a signal; treating as not ready");
                false
            }
            Err(err) => return Err(InwatchError::ReadinessWait(err)),
        };
        if !ready {
            return Ok(Cycle::default());
        }

        let pending = channel.pending_bytes().map_err(InwatchError::PendingBytes)?;
        if pending == 0 {
            debug!("channel readable but no bytes pending");
            return Ok(Cycle::default());
        }

        if self.buffer.ensure(pending) {
            debug!(capacity = self.buffer.capacity(), "grew read buffer");
        }

        let bytes_read = match channel.read(self.buffer.region_mut(pending)) {
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                debug!(error = %err, "read returned no data");
                0
            }
            Err(err) => return Err(InwatchError::Read(err)),
        };

        let (events, truncated) = match decode(self.buffer.as_slice(), bytes_read) {
            Ok(events) => (events, None),
            Err(mut err) => {
                let events = std::mem::take(&mut err.decoded);
                warn!(
                    offset = err.offset,
                    needed = err.needed,
                    available = err.available,
                    kept = events.len(),
                    "discarding truncated record tail"
                );
                (events, Some(err))
            }
        };

        debug!(pending, bytes_read, events = events.len(), "poll cycle complete");
        Ok(Cycle {
            bytes_read,
            events,
            truncated,
        })
    }
}

// The kernel reports queue overflow with watch id -1; no watch owns it.
fn is_unroutable(event: &Event) -> bool {
    event.watch_id.get() < 0
}
