//! Event decoder
//!
//! Walks a buffer of raw records produced by a single read and turns it into
//! events, preserving byte-offset order. No I/O happens here.

use crate::error::{ProtocolViolation, Result};
use crate::event::{Event, WatchDescriptor};
use crate::mask::EventMask;
use crate::record::{RecordHeader, HEADER_SIZE};
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// Iterator over the records in one read buffer
///
/// Yields at most one error, after which it is exhausted.
pub struct Records<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_record(&mut self) -> std::result::Result<Event, ProtocolViolation> {
        let len = self.buf.len();
        let rest = &self.buf[self.offset..];

        let header = RecordHeader::read(rest).ok_or(ProtocolViolation::TruncatedHeader {
            offset: self.offset,
            len,
        })?;

        let record_len = header.record_len();
        if record_len > rest.len() {
            return Err(ProtocolViolation::NameOverrun {
                offset: self.offset,
                name_len: header.len as usize,
                len,
            });
        }

        let event = Event {
            watch: WatchDescriptor::from_raw(header.wd),
            mask: EventMask::from_bits_retain(header.mask),
            cookie: header.cookie,
            name: decode_name(&rest[HEADER_SIZE..record_len]),
        };

        self.offset += record_len;
        Ok(event)
    }
}

impl Iterator for Records<'_> {
    type Item = std::result::Result<Event, ProtocolViolation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buf.len() {
            return None;
        }

        let item = self.next_record();
        if item.is_err() {
            // Nothing after a bad record can be trusted
            self.offset = self.buf.len();
        }
        Some(item)
    }
}

/// Name field of a record, without its NUL padding
///
/// Space may be reserved for a name that is still empty, so a leading NUL
/// also means "no name".
fn decode_name(field: &[u8]) -> Option<std::ffi::OsString> {
    match field.first() {
        None | Some(0) => None,
        Some(_) => {
            let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            Some(OsStr::from_bytes(&field[..end]).to_os_string())
        }
    }
}

/// Decode every record in `buf`
pub fn decode(buf: &[u8]) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    decode_into(buf, &mut events)?;
    Ok(events)
}

/// Decode every record in `buf`, appending to `events`
///
/// Returns the number of events appended. On error `events` is left as it
/// was before the call.
pub fn decode_into(buf: &[u8], events: &mut Vec<Event>) -> Result<usize> {
    let start = events.len();

    for record in Records::new(buf) {
        match record {
            Ok(event) => events.push(event),
            Err(violation) => {
                events.truncate(start);
                return Err(violation.into());
            }
        }
    }

    Ok(events.len() - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::encode_record;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStrExt;

    #[test]
    fn test_empty_buffer() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_mixed_records_keep_order_and_fields() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::CREATE.bits(), 0, b"f");
        encode_record(&mut buf, 1, EventMask::MOVED_FROM.bits(), 42, b"a-much-longer-name.txt");
        encode_record(&mut buf, 1, EventMask::MOVED_TO.bits(), 42, b"b");
        encode_record(&mut buf, 2, EventMask::DELETE_SELF.bits(), 0, b"");
        encode_record(&mut buf, 2, EventMask::IGNORED.bits(), 0, b"");

        let events = decode(&buf).unwrap();
        assert_eq!(events.len(), 5);

        assert_eq!(events[0].watch, WatchDescriptor::from_raw(1));
        assert_eq!(events[0].mask, EventMask::CREATE);
        assert_eq!(events[0].name, Some(OsString::from("f")));

        assert_eq!(events[1].mask, EventMask::MOVED_FROM);
        assert_eq!(events[1].cookie, 42);
        assert_eq!(events[1].name, Some(OsString::from("a-much-longer-name.txt")));
        assert_eq!(events[2].mask, EventMask::MOVED_TO);
        assert_eq!(events[2].cookie, events[1].cookie);

        assert_eq!(events[3].watch, WatchDescriptor::from_raw(2));
        assert_eq!(events[3].mask, EventMask::DELETE_SELF);
        assert_eq!(events[3].name, None);
        assert_eq!(events[4].mask, EventMask::IGNORED);
    }

    #[test]
    fn test_reserved_but_empty_name_is_none() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::ATTRIB.bits(), 0, b"");
        // Kernel-style header with 16 bytes of name space that are all NUL
        buf[12..16].copy_from_slice(&16u32.to_ne_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        encode_record(&mut buf, 1, EventMask::OPEN.bits(), 0, b"next");

        let events = decode(&buf).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, None);
        assert_eq!(events[1].name, Some(OsString::from("next")));
    }

    #[test]
    fn test_non_utf8_name_survives() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::CREATE.bits(), 0, b"caf\xe9");

        let events = decode(&buf).unwrap();
        let name = events[0].name.as_ref().unwrap();
        assert_eq!(name.as_bytes(), b"caf\xe9");
        assert_eq!(events[0].name_lossy().unwrap(), "caf\u{fffd}");
    }

    #[test]
    fn test_truncated_header_is_a_violation() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::CREATE.bits(), 0, b"f");
        let whole = buf.len();
        buf.extend_from_slice(&[1, 0, 0, 0]);

        let err = decode(&buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolViolation::TruncatedHeader { offset, .. }) if offset == whole
        ));
    }

    #[test]
    fn test_name_overrun_is_a_violation() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::CREATE.bits(), 0, b"f");
        // Claim a longer name than the buffer holds
        buf[12..16].copy_from_slice(&64u32.to_ne_bytes());

        let err = decode(&buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolViolation::NameOverrun { offset: 0, name_len: 64, .. })
        ));
    }

    #[test]
    fn test_decode_into_leaves_output_untouched_on_error() {
        let mut good = Vec::new();
        encode_record(&mut good, 1, EventMask::CREATE.bits(), 0, b"a");
        let mut events = decode(&good).unwrap();

        let mut bad = good.clone();
        bad.extend_from_slice(&[0u8; 3]);
        assert!(decode_into(&bad, &mut events).is_err());
        assert_eq!(events.len(), 1);

        assert_eq!(decode_into(&good, &mut events).unwrap(), 1);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_records_iterator_stops_after_violation() {
        let mut buf = Vec::new();
        encode_record(&mut buf, 1, EventMask::CREATE.bits(), 0, b"a");
        buf.extend_from_slice(&[0u8; 5]);

        let mut records = Records::new(&buf);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(records.offset(), HEADER_SIZE + 16);
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_seeded_batches_decode_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x1f07);
        let mut buf = Vec::new();
        let mut expected = Vec::new();

        for i in 0..200 {
            let wd = rng.gen_range(1..64);
            let mask = EventMask::ALL_EVENTS.bits() & rng.gen::<u32>();
            let cookie = rng.gen::<u32>();
            let name_len = if rng.gen_bool(0.3) { 0 } else { rng.gen_range(1..=255) };
            let name: Vec<u8> = (0..name_len).map(|_| rng.gen_range(b'!'..=b'~')).collect();

            encode_record(&mut buf, wd, mask, cookie, &name);
            expected.push((i, wd, mask, cookie, name));
        }

        let events = decode(&buf).unwrap();
        assert_eq!(events.len(), expected.len());

        for (event, (i, wd, mask, cookie, name)) in events.iter().zip(expected) {
            assert_eq!(event.watch.as_raw(), wd, "record {i}");
            assert_eq!(event.mask.bits(), mask, "record {i}");
            assert_eq!(event.cookie, cookie, "record {i}");
            if name.is_empty() {
                assert_eq!(event.name, None, "record {i}");
            } else {
                assert_eq!(event.name.as_ref().unwrap().as_bytes(), &name[..], "record {i}");
            }
        }
    }
}
