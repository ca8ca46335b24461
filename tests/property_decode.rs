// tests/property_decode.rs

mod common;
use crate::common::builders::RecordStreamBuilder;

use inwatch::decode::decode;
use inwatch::EventMask;
use proptest::prelude::*;

// Names as the kernel would hand them out: no NUL, no '/'.
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._ -]{0,40}"
}

fn record_strategy() -> impl Strategy<Value = (i32, u32, u32, String)> {
    (1..64i32, any::<u32>(), any::<u32>(), name_strategy())
}

proptest! {
    #[test]
    fn encoded_streams_decode_to_the_same_events(
        records in proptest::collection::vec(record_strategy(), 0..20)
    ) {
        let mut stream = RecordStreamBuilder::new();
        for (wd, mask, cookie, name) in &records {
            stream = stream.record(*wd, EventMask::from_bits_retain(*mask), *cookie, name);
        }
        let expected = stream.events().to_vec();
        let bytes = stream.build();

        let events = decode(&bytes, bytes.len()).unwrap();
        prop_assert_eq!(events, expected);
    }

    #[test]
    fn any_cut_point_yields_a_prefix_of_the_stream(
        records in proptest::collection::vec(record_strategy(), 1..10),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut stream = RecordStreamBuilder::new();
        for (wd, mask, cookie, name) in &records {
            stream = stream.record(*wd, EventMask::from_bits_retain(*mask), *cookie, name);
        }
        let expected = stream.events().to_vec();
        let bytes = stream.build();
        let length = cut.index(bytes.len() + 1);

        let decoded = match decode(&bytes, length) {
            Ok(events) => events,
            Err(truncated) => {
                prop_assert!(truncated.offset + truncated.available == length);
                prop_assert!(truncated.needed > truncated.available);
                truncated.into_decoded()
            }
        };
        prop_assert!(decoded.len() <= expected.len());
        prop_assert_eq!(&decoded[..], &expected[..decoded.len()]);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes, bytes.len());
    }
}
