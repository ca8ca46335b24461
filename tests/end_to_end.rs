// tests/end_to_end.rs

mod common;
use crate::common::{init_tracing, recorder::Recorder, CREATE, DELETE};

use inwatch::{Event, MockChannel, Notifier, PollOutcome, WatchId};

/// Register a watch, subscribe, feed two records, poll once.
#[test]
fn create_then_delete_reaches_the_subscriber() {
    init_tracing();
    let channel = MockChannel::with_first_id(7);
    let mut notifier = Notifier::new(channel.clone());
    let recorder = Recorder::new();

    let id = notifier.add_watch("/tmp/inbox", CREATE | DELETE).unwrap();
    assert_eq!(id, WatchId(7));
    notifier
        .attach(id, CREATE | DELETE, recorder.event_handler("log"))
        .unwrap();

    channel.push_event(&Event::new(7, CREATE, 0, "a.txt"));
    channel.push_event(&Event::new(7, DELETE, 0, "a.txt"));

    let outcome = notifier.poll(100).unwrap();
    let report = match outcome {
        PollOutcome::Dispatched(report) => report,
        PollOutcome::Drained(_) => panic!("default mode should dispatch"),
    };

    assert_eq!(report.dispatched, 2);
    assert!(report.dispatch.is_clean());
    assert_eq!(
        recorder.calls(),
        vec!["log:IN_CREATE:0:a.txt", "log:IN_DELETE:0:a.txt"]
    );

    // Second poll sees an empty channel.
    let outcome = notifier.poll(0).unwrap();
    assert!(matches!(outcome, PollOutcome::Dispatched(r) if r.dispatched == 0));
}

#[test]
fn removing_a_watch_silences_its_subscribers() {
    init_tracing();
    let channel = MockChannel::new();
    let mut notifier = Notifier::new(channel.clone());
    let recorder = Recorder::new();

    let id = notifier.add_watch("/tmp/inbox", CREATE).unwrap();
    notifier.attach(id, CREATE, recorder.handler("h")).unwrap();
    assert!(notifier.remove_watch(id));

    // A late event for the old id is consumed with nothing to run.
    channel.push_event(&Event::new(id, CREATE, 0, "late"));
    let report = notifier.poll_dispatch(0).unwrap();
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.dispatch.invoked, 0);
    assert!(recorder.calls().is_empty());
}

#[test]
fn rename_pair_shares_a_cookie() {
    init_tracing();
    let channel = MockChannel::new();
    let mut notifier = Notifier::new(channel.clone());
    let recorder = Recorder::new();

    let id = notifier
        .add_watch("/tmp/inbox", inwatch::EventMask::MOVE)
        .unwrap();
    notifier
        .attach(id, inwatch::EventMask::MOVE, recorder.event_handler("mv"))
        .unwrap();

    channel.push_event(&Event::new(id, inwatch::EventMask::MOVED_FROM, 12, "old.txt"));
    channel.push_event(&Event::new(id, inwatch::EventMask::MOVED_TO, 12, "new.txt"));

    notifier.poll_dispatch(0).unwrap();
    assert_eq!(
        recorder.calls(),
        vec!["mv:IN_MOVED_FROM:12:old.txt", "mv:IN_MOVED_TO:12:new.txt"]
    );
}
