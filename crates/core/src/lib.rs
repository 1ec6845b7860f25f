//! Kernel-facing data model for notifyx
//!
//! This crate provides the I/O-free half of the notification primitive:
//! - Event-interest mask constants
//! - Raw event record layout
//! - Event decoder for packed record streams
//! - Error taxonomy shared with the channel

pub mod decode;
pub mod error;
pub mod event;
pub mod mask;
pub mod record;

// Re-exports
pub use decode::{decode, decode_into, Records};
pub use error::{Error, ProtocolViolation, Result};
pub use event::{Event, WatchDescriptor};
pub use mask::EventMask;
pub use record::{DEFAULT_BUFFER_CAPACITY, HEADER_SIZE, MIN_BUFFER_CAPACITY};
