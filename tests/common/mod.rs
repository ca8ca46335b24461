#![allow(dead_code)]

pub use inwatch_test_utils::{builders, init_tracing, recorder};

use inwatch::{EventMask, MockChannel, Notifier};

/// Notifier over a mock channel, plus a handle for scripting the channel.
pub fn mock_notifier() -> (Notifier<MockChannel>, MockChannel) {
    init_tracing();
    let channel = MockChannel::new();
    (Notifier::new(channel.clone()), channel)
}

pub const CREATE: EventMask = EventMask::CREATE;
pub const DELETE: EventMask = EventMask::DELETE;
pub const MODIFY: EventMask = EventMask::MODIFY;
