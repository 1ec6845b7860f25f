//! Poll-and-drain for tokio tasks
//!
//! The blocking readiness wait is replaced by the runtime's reactor so other
//! tasks keep running while a poll waits. Reads only happen once the channel
//! is known to be readable, so the drain itself never blocks.

use crate::channel::Channel;
use crate::config::PollConfig;
use crate::poll::Poller;
use crate::timeout::Timeout;
use notifyx_core::{Error, Event, Result};
use std::os::fd::AsRawFd;
use std::time::Duration;
use tokio::io::unix::AsyncFd;
use tokio::time::Instant;
use tracing::trace;

/// A [`Channel`] registered with the tokio reactor
///
/// Dropping a pending [`AsyncChannel::poll_events`] future cancels the wait.
pub struct AsyncChannel {
    inner: AsyncFd<Channel>,
    poller: Poller,
}

impl AsyncChannel {
    /// Register `channel` with the current runtime
    ///
    /// Must be called from within a tokio runtime with I/O enabled.
    pub fn new(channel: Channel) -> Result<Self> {
        Self::with_config(channel, PollConfig::default())
    }

    pub fn with_config(channel: Channel, config: PollConfig) -> Result<Self> {
        let inner = AsyncFd::new(channel).map_err(|source| Error::Os {
            op: "epoll_ctl",
            source,
        })?;

        Ok(Self {
            inner,
            poller: Poller::new(config),
        })
    }

    /// Open a fresh channel and register it
    pub fn create() -> Result<Self> {
        Self::new(Channel::create()?)
    }

    /// The underlying channel, for adding and removing watches
    pub fn get_ref(&self) -> &Channel {
        self.inner.get_ref()
    }

    /// Deregister from the reactor and hand the channel back
    pub fn into_inner(self) -> Channel {
        self.inner.into_inner()
    }

    /// Return every event available within `timeout`
    ///
    /// Same contract as [`Channel::poll_events`], but waiting suspends only
    /// the calling task.
    pub async fn poll_events(&self, timeout: impl Into<Timeout>) -> Result<Vec<Event>> {
        let timeout = timeout.into();
        if timeout.duration() == Some(Duration::ZERO) {
            return self.poller.poll(self.inner.get_ref(), Timeout::Immediate);
        }

        // A deadline past the clock's range is as good as none
        let deadline = timeout
            .duration()
            .and_then(|d| Instant::now().checked_add(d));

        loop {
            let readable = self.inner.readable();
            let ready = match deadline {
                None => readable.await,
                Some(deadline) => match tokio::time::timeout_at(deadline, readable).await {
                    Ok(ready) => ready,
                    Err(_) => return Ok(Vec::new()),
                },
            };
            let mut guard = ready.map_err(|source| Error::Os {
                op: "epoll_wait",
                source,
            })?;

            let channel = guard.get_inner();
            // Reactor readiness can be stale; confirm before reading
            if !channel.wait_readable(Timeout::Immediate)? {
                trace!("Spurious readiness on fd {}", channel.as_raw_fd());
                guard.clear_ready();
                continue;
            }

            let result = self.poller.drain_ready(channel);
            guard.clear_ready();
            return result;
        }
    }
}
