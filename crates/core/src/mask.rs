//! Event-interest mask
//!
//! Bit values are those of `<sys/inotify.h>`. They are part of the kernel ABI
//! and identical on every Linux architecture; the tests below cross-check them
//! against the `libc` bindings.

use crate::error::{Error, Result};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Set of event categories and watch modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        /// File was accessed
        const ACCESS = 0x0000_0001;
        /// File was modified
        const MODIFY = 0x0000_0002;
        /// Metadata changed
        const ATTRIB = 0x0000_0004;
        /// Writable file was closed
        const CLOSE_WRITE = 0x0000_0008;
        /// Unwritable file was closed
        const CLOSE_NOWRITE = 0x0000_0010;
        /// File was opened
        const OPEN = 0x0000_0020;
        /// Entry moved out of the watched directory
        const MOVED_FROM = 0x0000_0040;
        /// Entry moved into the watched directory
        const MOVED_TO = 0x0000_0080;
        /// Entry created in the watched directory
        const CREATE = 0x0000_0100;
        /// Entry deleted from the watched directory
        const DELETE = 0x0000_0200;
        /// Watched entry itself was deleted
        const DELETE_SELF = 0x0000_0400;
        /// Watched entry itself was moved
        const MOVE_SELF = 0x0000_0800;

        /// Backing filesystem was unmounted
        const UNMOUNT = 0x0000_2000;
        /// Kernel event queue overflowed
        const Q_OVERFLOW = 0x0000_4000;
        /// Watch was removed, explicitly or implicitly
        const IGNORED = 0x0000_8000;

        /// Only watch the path if it is a directory
        const ONLYDIR = 0x0100_0000;
        /// Do not dereference a symlink
        const DONT_FOLLOW = 0x0200_0000;
        /// Ignore events for children after they were unlinked
        const EXCL_UNLINK = 0x0400_0000;
        /// Add to the mask of an existing watch instead of replacing it
        const MASK_ADD = 0x2000_0000;
        /// Subject of the event is a directory
        const ISDIR = 0x4000_0000;
        /// Remove the watch after the first event
        const ONESHOT = 0x8000_0000;

        const CLOSE = Self::CLOSE_WRITE.bits() | Self::CLOSE_NOWRITE.bits();
        const MOVE = Self::MOVED_FROM.bits() | Self::MOVED_TO.bits();

        /// Every event category, without modifiers
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

/// Single-bit flags in header order, as printed by [`EventMask::describe`]
const NAMED: &[(&str, EventMask)] = &[
    ("IN_ACCESS", EventMask::ACCESS),
    ("IN_MODIFY", EventMask::MODIFY),
    ("IN_ATTRIB", EventMask::ATTRIB),
    ("IN_CLOSE_WRITE", EventMask::CLOSE_WRITE),
    ("IN_CLOSE_NOWRITE", EventMask::CLOSE_NOWRITE),
    ("IN_OPEN", EventMask::OPEN),
    ("IN_MOVED_FROM", EventMask::MOVED_FROM),
    ("IN_MOVED_TO", EventMask::MOVED_TO),
    ("IN_CREATE", EventMask::CREATE),
    ("IN_DELETE", EventMask::DELETE),
    ("IN_DELETE_SELF", EventMask::DELETE_SELF),
    ("IN_MOVE_SELF", EventMask::MOVE_SELF),
    ("IN_UNMOUNT", EventMask::UNMOUNT),
    ("IN_Q_OVERFLOW", EventMask::Q_OVERFLOW),
    ("IN_IGNORED", EventMask::IGNORED),
    ("IN_ONLYDIR", EventMask::ONLYDIR),
    ("IN_DONT_FOLLOW", EventMask::DONT_FOLLOW),
    ("IN_EXCL_UNLINK", EventMask::EXCL_UNLINK),
    ("IN_MASK_ADD", EventMask::MASK_ADD),
    ("IN_ISDIR", EventMask::ISDIR),
    ("IN_ONESHOT", EventMask::ONESHOT),
];

/// Composite names accepted by [`EventMask::parse`]
const ALIASES: &[(&str, EventMask)] = &[
    ("IN_CLOSE", EventMask::CLOSE),
    ("IN_MOVE", EventMask::MOVE),
    ("IN_ALL_EVENTS", EventMask::ALL_EVENTS),
];

impl EventMask {
    /// Render the mask as `IN_CREATE|IN_ISDIR`, or `0` when empty
    ///
    /// Bits without a name are appended as a single hex term so the
    /// description always accounts for the whole value.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| (*name).to_string())
            .collect();

        let unnamed = self.bits() & !Self::all().bits();
        if unnamed != 0 {
            parts.push(format!("{:#x}", unnamed));
        }

        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join("|")
        }
    }

    /// Parse a list of flag names
    ///
    /// Names may be separated by `|`, `,` or whitespace, are matched
    /// case-insensitively and may omit the `IN_` prefix. Composite names
    /// (`CLOSE`, `MOVE`, `ALL_EVENTS`) and hex literals are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let mut mask = EventMask::empty();

        for token in input
            .split(|c: char| c == '|' || c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            mask |= Self::parse_flag(token)?;
        }

        Ok(mask)
    }

    fn parse_flag(token: &str) -> Result<Self> {
        if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16)
                .map(Self::from_bits_retain)
                .map_err(|_| Error::UnknownFlag {
                    name: token.to_string(),
                });
        }

        let upper = token.to_ascii_uppercase();
        let bare = upper.strip_prefix("IN_").unwrap_or(&upper);

        NAMED
            .iter()
            .chain(ALIASES.iter())
            .find(|(name, _)| &name[3..] == bare)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| Error::UnknownFlag {
                name: token.to_string(),
            })
    }
}

impl Default for EventMask {
    /// Watches report every event category unless told otherwise
    fn default() -> Self {
        EventMask::ALL_EVENTS
    }
}

impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
