//! Filesystem change notification for notifyx
//!
//! This crate provides the I/O half of the notification primitive:
//! - Channel ownership and watch registration
//! - Timeout-bounded readiness wait
//! - Poll-and-drain loop collapsing bursts into few reads
//! - Path registry for resolving events
//! - Tokio integration for cooperative callers
//!
//! ```no_run
//! use notifyx_watcher::{Channel, EventMask};
//!
//! let channel = Channel::create()?;
//! let wd = channel.add_watch("/tmp", EventMask::CREATE)?;
//! for event in channel.poll_events(5.0)? {
//!     println!("{}", event);
//! }
//! channel.remove_watch(wd)?;
//! # Ok::<(), notifyx_watcher::Error>(())
//! ```

pub mod channel;
pub mod config;
pub mod nonblocking;
pub mod poll;
pub mod registry;
pub mod timeout;

// Re-exports
pub use channel::{channel_create, watch_add, watch_remove, Channel};
pub use config::{ConfigError, PollConfig};
pub use nonblocking::AsyncChannel;
pub use poll::{poll_events, EventSource, Poller};
pub use registry::{WatchRegistry, WatchedEvent};
pub use timeout::Timeout;

pub use notifyx_core::{
    Error, Event, EventMask, Result, WatchDescriptor, DEFAULT_BUFFER_CAPACITY, HEADER_SIZE,
};
