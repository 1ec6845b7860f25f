//! Error types shared by the decoder and the channel

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for notifyx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the notification primitives
///
/// Every variant is fatal to the call that produced it. Nothing is retried
/// and no partial event batch accompanies an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A channel, watch, readiness or read primitive failed
    #[error("{op} failed: {source}")]
    Os {
        /// Name of the failing system call
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The read buffer could not hold even one pending record
    #[error("event buffer too small ({capacity} bytes cannot hold the pending record)")]
    BufferTooSmall { capacity: usize },

    /// The raw event stream did not match the kernel record layout
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    /// Path cannot be handed to the kernel
    #[error("path contains an interior NUL byte: {}", path.display())]
    InvalidPath { path: PathBuf },

    /// Mask string named a flag that does not exist
    #[error("unknown event flag: {name}")]
    UnknownFlag { name: String },
}

impl Error {
    /// Capture `errno` for a failed system call
    pub fn last_os_error(op: &'static str) -> Self {
        Error::Os {
            op,
            source: io::Error::last_os_error(),
        }
    }

    /// Underlying platform error code, if this is an OS-level failure
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// A record in the read buffer would walk past the end of the data
///
/// Continuing past one of these would interpret unrelated bytes as event
/// data, so decoding stops at the first violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("truncated record header at offset {offset} (buffer holds {len} bytes)")]
    TruncatedHeader { offset: usize, len: usize },

    #[error("record at offset {offset} declares a {name_len}-byte name, overrunning the {len}-byte buffer")]
    NameOverrun {
        offset: usize,
        name_len: usize,
        len: usize,
    },
}
