//! Decoded event types

use crate::mask::EventMask;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;

/// Identifies one registered path+mask pair within a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchDescriptor(i32);

impl WatchDescriptor {
    /// Wrap a raw descriptor returned by the kernel
    pub const fn from_raw(wd: i32) -> Self {
        Self(wd)
    }

    /// Raw descriptor value
    pub const fn as_raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for WatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One filesystem event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Watch that produced the event
    pub watch: WatchDescriptor,
    /// What happened
    pub mask: EventMask,
    /// Links the two halves of a move (MOVED_FROM / MOVED_TO), otherwise 0
    pub cookie: u32,
    /// Child entry name; `None` when the event concerns the watched entry itself
    pub name: Option<OsString>,
}

impl Event {
    /// Name as text, replacing invalid UTF-8
    pub fn name_lossy(&self) -> Option<Cow<'_, str>> {
        self.name.as_deref().map(OsStr::to_string_lossy)
    }

    /// True if the event reports any of the flags in `mask`
    pub fn is(&self, mask: EventMask) -> bool {
        self.mask.intersects(mask)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.watch, self.mask)?;
        if let Some(name) = self.name_lossy() {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}
