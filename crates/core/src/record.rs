//! Raw event record layout
//!
//! The kernel hands out a packed stream of `struct inotify_event` headers,
//! each immediately followed by `len` bytes of NUL-padded name:
//! ```text
//! +--------+--------+--------+--------+------------------------+
//! | wd i32 | mask   | cookie | len    | name[len] (NUL padded) |
//! +--------+--------+--------+--------+------------------------+
//! ```
//! The next record starts exactly `HEADER_SIZE + len` bytes later.

use std::mem;

/// Size of the fixed record header
pub const HEADER_SIZE: usize = mem::size_of::<libc::inotify_event>();

/// Longest file name the kernel will report
pub const NAME_MAX: usize = 255;

/// Smallest buffer guaranteed to hold any single record
pub const MIN_BUFFER_CAPACITY: usize = HEADER_SIZE + NAME_MAX + 1;

/// Default read buffer capacity: room for 1024 records with short names
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * (HEADER_SIZE + 16);

/// Decoded fixed-size header of one raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub wd: i32,
    pub mask: u32,
    pub cookie: u32,
    pub len: u32,
}

impl RecordHeader {
    /// Read a header from the first `HEADER_SIZE` bytes of `bytes`
    ///
    /// Returns `None` if fewer than `HEADER_SIZE` bytes are available.
    pub fn read(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..HEADER_SIZE)?;
        Some(Self {
            wd: i32::from_ne_bytes(field(header, 0)),
            mask: u32::from_ne_bytes(field(header, 4)),
            cookie: u32::from_ne_bytes(field(header, 8)),
            len: u32::from_ne_bytes(field(header, 12)),
        })
    }

    /// Total size of the record this header introduces
    pub fn record_len(&self) -> usize {
        HEADER_SIZE + self.len as usize
    }
}

fn field(header: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&header[offset..offset + 4]);
    out
}

/// Padded length of a name field holding `name`
///
/// Includes the terminating NUL, rounded up to a multiple of `HEADER_SIZE`,
/// matching what the kernel emits. An absent name occupies no bytes.
pub fn padded_name_len(name: &[u8]) -> usize {
    if name.is_empty() {
        return 0;
    }
    (name.len() + 1).div_ceil(HEADER_SIZE) * HEADER_SIZE
}

/// Append one record to `buf` in kernel layout
///
/// An empty `name` produces a record with `len == 0`, which is how the
/// kernel reports events about the watched entry itself.
pub fn encode_record(buf: &mut Vec<u8>, wd: i32, mask: u32, cookie: u32, name: &[u8]) {
    let name_len = padded_name_len(name);

    buf.reserve(HEADER_SIZE + name_len);
    buf.extend_from_slice(&wd.to_ne_bytes());
    buf.extend_from_slice(&mask.to_ne_bytes());
    buf.extend_from_slice(&cookie.to_ne_bytes());
    buf.extend_from_slice(&(name_len as u32).to_ne_bytes());
    buf.extend_from_slice(name);
    buf.resize(buf.len() + name_len - name.len(), 0);
}
