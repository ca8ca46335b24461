// src/engine/mod.rs

//! Polling engine.
//!
//! One cycle is: wait (bounded) for the channel to become readable, ask for
//! the exact number of pending bytes, grow the read buffer if needed, read
//! once, decode. What happens to the decoded events depends on the call:
//!
//! - [`PollEngine::dispatch`] pushes every event through the router before
//!   returning;
//! - [`PollEngine::drain`] hands the events back to the caller;
//! - [`PollEngine::dispatch_watch`] dispatches only one watch's events and
//!   keeps the rest for later calls;
//! - [`PollEngine::dispatch_each`] runs one cycle and then a targeted pass
//!   per watch id.
//!
//! Events are retained across calls only by the targeted modes; the other
//! modes consume what was retained first, so stream order is kept. Events
//! that cannot belong to any watch are never retained; they come back in
//! [`PollReport::unrouted`].

use crate::decode::TruncatedRecord;
use crate::event::Event;
use crate::router::DispatchReport;

pub mod buffer;
pub mod poll;

pub use buffer::ReadBuffer;
pub use poll::PollEngine;

/// Default size of the read buffer before the first grow.
pub const DEFAULT_BUFFER_BYTES: usize = 4096;

/// Result of a dispatching poll call.
#[derive(Debug, Default)]
pub struct PollReport {
    /// Bytes read from the channel in this cycle.
    pub bytes_read: usize,
    /// Events handed to the router.
    pub dispatched: usize,
    /// Events still held back for a later targeted call.
    pub retained: usize,
    /// Events no subscription can ever match: queue overflow markers
    /// (watch id -1) and, for per-watch passes, events of watches that are
    /// no longer registered. Handed back instead of kept.
    pub unrouted: Vec<Event>,
    pub dispatch: DispatchReport,
    /// Set if the read ended in a partial record. Events decoded before it
    /// were dispatched; its `decoded` list has been moved out and is empty.
    pub truncated: Option<TruncatedRecord>,
}

/// Result of a draining poll call.
#[derive(Debug, Default)]
pub struct Drained {
    pub bytes_read: usize,
    /// Previously retained events followed by this cycle's events.
    pub events: Vec<Event>,
    /// See [`PollReport::truncated`].
    pub truncated: Option<TruncatedRecord>,
}

/// Either shape of poll result, for callers that let configuration pick
/// the mode.
#[derive(Debug)]
pub enum PollOutcome {
    Dispatched(PollReport),
    Drained(Drained),
}
