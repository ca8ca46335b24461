use std::sync::{Arc, Mutex};

use inwatch::{Event, Handler};

/// Shared call log for handlers under test.
///
/// Every handler built from the same recorder appends to one list, so a
/// test can assert on the relative order of several subscriptions.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that records `label` on each call.
    pub fn handler(&self, label: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        Handler::new(move || calls.lock().unwrap().push(label.clone()))
    }

    /// Handler that records `label:<mask>:<cookie>:<name>` on each call.
    pub fn event_handler(&self, label: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        Handler::with_event(move |event: &Event| {
            calls.lock().unwrap().push(format!(
                "{label}:{}:{}:{}",
                event.mask, event.cookie, event.name
            ));
        })
    }

    /// Handler that records `label` and then fails.
    pub fn failing_handler(&self, label: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        Handler::new(move || -> Result<(), String> {
            calls.lock().unwrap().push(label.clone());
            Err(format!("{label} failed"))
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}
