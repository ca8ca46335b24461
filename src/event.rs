// src/event.rs

use std::fmt;

use crate::types::{EventMask, WatchId};

/// One decoded change record.
///
/// `name` is empty when the event refers to the watched entry itself rather
/// than a child of a watched directory. `cookie` pairs the two halves of a
/// rename and is never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub watch_id: WatchId,
    pub mask: EventMask,
    pub cookie: u32,
    pub name: String,
}

impl Event {
    pub fn new(
        watch_id: impl Into<WatchId>,
        mask: EventMask,
        cookie: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            watch_id: watch_id.into(),
            mask,
            cookie,
            name: name.into(),
        }
    }

    /// True if the kernel flagged the subject as a directory.
    pub fn is_dir(&self) -> bool {
        self.mask.contains(EventMask::ISDIR)
    }

    /// True for the kernel's "events were dropped" marker.
    pub fn is_overflow(&self) -> bool {
        self.mask.contains(EventMask::Q_OVERFLOW)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----------------------")?;
        writeln!(f, "watch descriptor: {}", self.watch_id)?;
        writeln!(f, "mask:             {}", self.mask)?;
        writeln!(f, "cookie:           {}", self.cookie)?;
        writeln!(f, "name length:      {}", self.name.len())?;
        write!(f, "name:             {}", self.name)
    }
}
