// tests/decode_records.rs

mod common;
use crate::common::builders::RecordStreamBuilder;

use inwatch::decode::{decode, record_len, HEADER_SIZE};
use inwatch::{Event, EventMask, WatchId};

#[test]
fn decodes_concatenated_records_in_order() {
    let stream = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "a.txt")
        .record(1, EventMask::MODIFY, 0, "a.txt")
        .record(2, EventMask::MOVED_FROM, 42, "old")
        .record(2, EventMask::MOVED_TO, 42, "a-much-longer-name-than-sixteen-bytes");
    let expected = stream.events().to_vec();
    let bytes = stream.build();

    let events = decode(&bytes, bytes.len()).unwrap();
    assert_eq!(events, expected);
}

#[test]
fn empty_buffer_decodes_to_no_events() {
    assert_eq!(decode(&[], 0).unwrap(), Vec::<Event>::new());
}

#[test]
fn record_without_name_has_empty_name() {
    let bytes = RecordStreamBuilder::new()
        .record(3, EventMask::DELETE_SELF, 0, "")
        .build();
    assert_eq!(bytes.len(), HEADER_SIZE);

    let events = decode(&bytes, bytes.len()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].watch_id, WatchId(3));
    assert_eq!(events[0].name, "");
}

#[test]
fn name_padding_is_trimmed_and_skipped() {
    let bytes = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "x")
        .record(1, EventMask::DELETE, 0, "y")
        .build();
    // Each name is padded to a full 16 bytes.
    assert_eq!(bytes.len(), 2 * record_len("x"));
    assert_eq!(record_len("x"), HEADER_SIZE + 16);

    let events = decode(&bytes, bytes.len()).unwrap();
    assert_eq!(events[0].name, "x");
    assert_eq!(events[1].name, "y");
}

#[test]
fn unknown_mask_bits_are_kept() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&5i32.to_ne_bytes());
    bytes.extend_from_slice(&(0x0000_1000u32 | EventMask::CREATE.bits()).to_ne_bytes());
    bytes.extend_from_slice(&0u32.to_ne_bytes());
    bytes.extend_from_slice(&0u32.to_ne_bytes());

    let events = decode(&bytes, bytes.len()).unwrap();
    assert_eq!(events[0].mask.bits(), 0x0000_1100);
    assert!(events[0].mask.contains(EventMask::CREATE));
}

#[test]
fn truncated_name_returns_preceding_events() {
    let stream = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "first")
        .record(1, EventMask::DELETE, 0, "second");
    let first = stream.events()[0].clone();
    let bytes = stream.chop(3).build();

    let err = decode(&bytes, bytes.len()).unwrap_err();
    assert_eq!(err.offset, record_len("first"));
    assert_eq!(err.needed, record_len("second"));
    assert_eq!(err.available, record_len("second") - 3);
    assert_eq!(err.into_decoded(), vec![first]);
}

#[test]
fn truncated_header_is_reported() {
    let bytes = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "ok")
        .raw(&[1, 0, 0, 0, 2, 0])
        .build();

    let err = decode(&bytes, bytes.len()).unwrap_err();
    assert_eq!(err.needed, HEADER_SIZE);
    assert_eq!(err.available, 6);
    assert_eq!(err.decoded.len(), 1);
}

#[test]
fn length_limits_the_decoded_region() {
    let stream = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "a")
        .record(1, EventMask::CREATE, 0, "b");
    let bytes = stream.build();

    let events = decode(&bytes, record_len("a")).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "a");
}

#[test]
fn length_beyond_buffer_never_reads_past_the_end() {
    let bytes = RecordStreamBuilder::new()
        .record(1, EventMask::CREATE, 0, "a")
        .build();

    let events = decode(&bytes, bytes.len() + 100).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn huge_declared_name_length_is_truncation_not_overflow() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1i32.to_ne_bytes());
    bytes.extend_from_slice(&EventMask::CREATE.bits().to_ne_bytes());
    bytes.extend_from_slice(&0u32.to_ne_bytes());
    bytes.extend_from_slice(&u32::MAX.to_ne_bytes());

    let err = decode(&bytes, bytes.len()).unwrap_err();
    assert_eq!(err.offset, 0);
    assert!(err.decoded.is_empty());
}
