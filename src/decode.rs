// src/decode.rs

//! Decoding of the raw record stream returned by the notification channel.
//!
//! A read from the channel yields zero or more records laid out back to
//! back:
//!
//! ```text
//! | wd: i32 | mask: u32 | cookie: u32 | len: u32 | name: [u8; len] |
//! ```
//!
//! All header fields use native byte order. `name` is NUL padded by the
//! kernel, so `len` may exceed the visible name length.
//!
//! The decoder knows nothing about watches or subscriptions; it only turns
//! bytes into [`Event`]s, in stream order.

use thiserror::Error;
use tracing::trace;

use crate::event::Event;
use crate::types::{EventMask, WatchId};

/// Size of the fixed record header in bytes.
pub const HEADER_SIZE: usize = 16;

/// The buffer ended in the middle of a record.
///
/// Everything decoded before the bad record is carried along in
/// `decoded` so that a partial batch can still be processed; the
/// malformed tail is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("truncated record at offset {offset}: needs {needed} bytes, {available} available")]
pub struct TruncatedRecord {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
    pub decoded: Vec<Event>,
}

impl TruncatedRecord {
    /// Consume the error, keeping the events decoded before the truncation.
    pub fn into_decoded(self) -> Vec<Event> {
        self.decoded
    }
}

/// Decode the first `length` bytes of `buffer` into events.
///
/// `length` is clamped to `buffer.len()`, so the decoder never looks past
/// the end of the slice whatever the caller claims.
pub fn decode(buffer: &[u8], length: usize) -> Result<Vec<Event>, TruncatedRecord> {
    let data = &buffer[..length.min(buffer.len())];
    let mut events = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let available = data.len() - offset;

        if available < HEADER_SIZE {
            return Err(TruncatedRecord {
                offset,
                needed: HEADER_SIZE,
                available,
                decoded: events,
            });
        }

        let header = &data[offset..offset + HEADER_SIZE];
        let wd = i32::from_ne_bytes(field(header, 0));
        let mask = u32::from_ne_bytes(field(header, 4));
        let cookie = u32::from_ne_bytes(field(header, 8));
        let name_len = u32::from_ne_bytes(field(header, 12)) as usize;

        let needed = HEADER_SIZE.saturating_add(name_len);
        if needed > available {
            return Err(TruncatedRecord {
                offset,
                needed,
                available,
                decoded: events,
            });
        }

        let name = decode_name(&data[offset + HEADER_SIZE..offset + needed]);
        trace!(offset, wd, mask, cookie, name = %name, "decoded record");

        events.push(Event {
            watch_id: WatchId(wd),
            mask: EventMask::from_bits_retain(mask),
            cookie,
            name,
        });

        offset += needed;
    }

    Ok(events)
}

/// Bytes one event occupies on the wire, including the kernel's padding.
pub fn record_len(name: &str) -> usize {
    HEADER_SIZE + padded_name_len(name.len())
}

/// Append the wire form of `event` to `out`.
///
/// The name gets at least one NUL terminator and is padded up to a
/// multiple of [`HEADER_SIZE`], matching what the kernel writes. Used by
/// the in-memory channel and by tests to build record streams.
pub fn encode(event: &Event, out: &mut Vec<u8>) {
    let padded = padded_name_len(event.name.len());

    out.reserve(HEADER_SIZE + padded);
    out.extend_from_slice(&event.watch_id.get().to_ne_bytes());
    out.extend_from_slice(&event.mask.bits().to_ne_bytes());
    out.extend_from_slice(&event.cookie.to_ne_bytes());
    out.extend_from_slice(&(padded as u32).to_ne_bytes());
    out.extend_from_slice(event.name.as_bytes());
    out.resize(out.len() + (padded - event.name.len()), 0);
}

fn padded_name_len(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (len + 1).div_ceil(HEADER_SIZE) * HEADER_SIZE
}

fn field(header: &[u8], at: usize) -> [u8; 4] {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&header[at..at + 4]);
    bytes
}

// The name ends at the first NUL; anything after it is padding.
fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
