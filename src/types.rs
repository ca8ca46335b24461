// src/types.rs

//! Small value types shared by every layer: watch ids, event masks,
//! channel init flags and the engine's behaviour switches.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Deserialize;

/// Watch descriptor issued by the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub i32);

impl WatchId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for WatchId {
    fn from(raw: i32) -> Self {
        WatchId(raw)
    }
}

bitflags! {
    /// Kernel event mask. Bit values follow `include/uapi/linux/inotify.h`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        const ACCESS = 0x0000_0001;
        const MODIFY = 0x0000_0002;
        const ATTRIB = 0x0000_0004;
        const CLOSE_WRITE = 0x0000_0008;
        const CLOSE_NOWRITE = 0x0000_0010;
        const OPEN = 0x0000_0020;
        const MOVED_FROM = 0x0000_0040;
        const MOVED_TO = 0x0000_0080;
        const CREATE = 0x0000_0100;
        const DELETE = 0x0000_0200;
        const DELETE_SELF = 0x0000_0400;
        const MOVE_SELF = 0x0000_0800;

        const UNMOUNT = 0x0000_2000;
        const Q_OVERFLOW = 0x0000_4000;
        const IGNORED = 0x0000_8000;

        const ONLYDIR = 0x0100_0000;
        const DONT_FOLLOW = 0x0200_0000;
        const EXCL_UNLINK = 0x0400_0000;
        const MASK_CREATE = 0x1000_0000;
        const MASK_ADD = 0x2000_0000;
        const ISDIR = 0x4000_0000;
        const ONESHOT = 0x8000_0000;

        const CLOSE = Self::CLOSE_WRITE.bits() | Self::CLOSE_NOWRITE.bits();
        const MOVE = Self::MOVED_FROM.bits() | Self::MOVED_TO.bits();
        const ALL_EVENTS = Self::ACCESS.bits()
            | Self::MODIFY.bits()
            | Self::ATTRIB.bits()
            | Self::CLOSE_WRITE.bits()
            | Self::CLOSE_NOWRITE.bits()
            | Self::OPEN.bits()
            | Self::MOVED_FROM.bits()
            | Self::MOVED_TO.bits()
            | Self::CREATE.bits()
            | Self::DELETE.bits()
            | Self::DELETE_SELF.bits()
            | Self::MOVE_SELF.bits();
    }
}

/// Single-bit flags with their kernel names, in ascending bit order.
const MASK_NAMES: &[(EventMask, &str)] = &[
    (EventMask::ACCESS, "IN_ACCESS"),
    (EventMask::MODIFY, "IN_MODIFY"),
    (EventMask::ATTRIB, "IN_ATTRIB"),
    (EventMask::CLOSE_WRITE, "IN_CLOSE_WRITE"),
    (EventMask::CLOSE_NOWRITE, "IN_CLOSE_NOWRITE"),
    (EventMask::OPEN, "IN_OPEN"),
    (EventMask::MOVED_FROM, "IN_MOVED_FROM"),
    (EventMask::MOVED_TO, "IN_MOVED_TO"),
    (EventMask::CREATE, "IN_CREATE"),
    (EventMask::DELETE, "IN_DELETE"),
    (EventMask::DELETE_SELF, "IN_DELETE_SELF"),
    (EventMask::MOVE_SELF, "IN_MOVE_SELF"),
    (EventMask::UNMOUNT, "IN_UNMOUNT"),
    (EventMask::Q_OVERFLOW, "IN_Q_OVERFLOW"),
    (EventMask::IGNORED, "IN_IGNORED"),
    (EventMask::ONLYDIR, "IN_ONLYDIR"),
    (EventMask::DONT_FOLLOW, "IN_DONT_FOLLOW"),
    (EventMask::EXCL_UNLINK, "IN_EXCL_UNLINK"),
    (EventMask::MASK_CREATE, "IN_MASK_CREATE"),
    (EventMask::MASK_ADD, "IN_MASK_ADD"),
    (EventMask::ISDIR, "IN_ISDIR"),
    (EventMask::ONESHOT, "IN_ONESHOT"),
];

impl EventMask {
    /// True if the two masks share at least one bit.
    ///
    /// This is the subscription matching rule: a compound filter matches
    /// any event carrying one of its bits.
    pub fn overlaps(self, other: EventMask) -> bool {
        self.intersects(other)
    }

    /// Parse a comma separated list such as `"create,delete"`.
    pub fn parse_list(list: &str) -> Result<EventMask, String> {
        let mut mask = EventMask::empty();
        for part in split_event_list(list) {
            mask |= part.parse::<EventMask>()?;
        }
        Ok(mask)
    }
}

/// Split `"create, delete,,modify"` into its non-empty, trimmed names.
pub fn split_event_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Renders the mask as `IN_CREATE | IN_DELETE`. Zero renders as an empty
/// string; bits without a kernel name are skipped.
impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in MASK_NAMES {
            if self.contains(*flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Accepts a single event name, either in config spelling (`"create"`,
/// `"close_write"`, `"all"`) or kernel spelling (`"IN_CREATE"`).
impl FromStr for EventMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let name = lowered.strip_prefix("in_").unwrap_or(&lowered);
        let mask = match name {
            "access" => EventMask::ACCESS,
            "modify" => EventMask::MODIFY,
            "attrib" => EventMask::ATTRIB,
            "close_write" => EventMask::CLOSE_WRITE,
            "close_nowrite" => EventMask::CLOSE_NOWRITE,
            "close" => EventMask::CLOSE,
            "open" => EventMask::OPEN,
            "moved_from" => EventMask::MOVED_FROM,
            "moved_to" => EventMask::MOVED_TO,
            "move" => EventMask::MOVE,
            "create" => EventMask::CREATE,
            "delete" => EventMask::DELETE,
            "delete_self" => EventMask::DELETE_SELF,
            "move_self" => EventMask::MOVE_SELF,
            "onlydir" => EventMask::ONLYDIR,
            "dont_follow" => EventMask::DONT_FOLLOW,
            "excl_unlink" => EventMask::EXCL_UNLINK,
            "mask_add" => EventMask::MASK_ADD,
            "oneshot" => EventMask::ONESHOT,
            "all" | "all_events" => EventMask::ALL_EVENTS,
            other => return Err(format!("unknown event name: {other:?}")),
        };
        Ok(mask)
    }
}

bitflags! {
    /// Flags passed when opening the channel (`inotify_init1`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InitFlags: i32 {
        const NONBLOCK = libc::O_NONBLOCK;
        const CLOEXEC = libc::O_CLOEXEC;
    }
}

/// How a poll cycle hands decoded events to the caller.
///
/// - `Dispatch`: every event goes through the router before `poll` returns
///   (default).
/// - `Drain`: events are returned as a list; no handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionMode {
    #[default]
    Dispatch,
    Drain,
}

impl FromStr for ConsumptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dispatch" => Ok(ConsumptionMode::Dispatch),
            "drain" => Ok(ConsumptionMode::Drain),
            other => Err(format!(
                "invalid mode: {other} (expected \"dispatch\" or \"drain\")"
            )),
        }
    }
}

/// What the router does with handler failures after a dispatch pass.
///
/// - `Collect`: return them to the caller once every matching handler has
///   run (default).
/// - `Swallow`: log them and report nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandlerFailurePolicy {
    #[default]
    Collect,
    Swallow,
}

impl FromStr for HandlerFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collect" => Ok(HandlerFailurePolicy::Collect),
            "swallow" => Ok(HandlerFailurePolicy::Swallow),
            other => Err(format!(
                "invalid handler_failures: {other} (expected \"collect\" or \"swallow\")"
            )),
        }
    }
}
