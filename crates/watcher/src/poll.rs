//! Poll-and-drain loop
//!
//! One poll waits (bounded by the caller's timeout) for the channel to become
//! readable, then reads and decodes greedily for as long as more records are
//! immediately available:
//! ```text
//!            ready                  more pending
//! Waiting ─────────────▶ Draining ◀─────────────┐
//!    │ timed out            │  │ read + decode  │
//!    ▼                      │  └────────────────┘
//!  Done ◀───────────────────┘ nothing pending
//!
//! any OS error, zero-byte read, bad record ──▶ Failed
//! ```
//! `Failed` discards everything accumulated so far.

use crate::config::PollConfig;
use crate::timeout::Timeout;
use notifyx_core::{decode_into, Error, Event, Result};
use tracing::{debug, trace, warn};

/// Readiness and read primitives the loop is driven by
pub trait EventSource {
    /// Wait until at least one whole record can be read
    ///
    /// Returns `false` if `timeout` elapsed first.
    fn wait_readable(&self, timeout: Timeout) -> Result<bool>;

    /// Read as many whole records as fit in `buf`
    ///
    /// Returns the number of bytes read. Zero means the buffer could not hold
    /// even one pending record.
    fn read_into(&self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: EventSource + ?Sized> EventSource for &S {
    fn wait_readable(&self, timeout: Timeout) -> Result<bool> {
        (**self).wait_readable(timeout)
    }

    fn read_into(&self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_into(buf)
    }
}

/// Loop state
#[derive(Debug)]
pub(crate) enum State {
    Waiting(Timeout),
    Draining,
    Done,
    Failed(Error),
}

/// Runs poll-and-drain calls with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Return every event available within `timeout`
    ///
    /// An empty batch means the timeout elapsed with nothing pending.
    pub fn poll<S>(&self, source: &S, timeout: impl Into<Timeout>) -> Result<Vec<Event>>
    where
        S: EventSource + ?Sized,
    {
        Drain::new(source, self.config.buffer_capacity).run(State::Waiting(timeout.into()))
    }

    /// Drain a source already known to be readable, skipping the wait
    pub(crate) fn drain_ready<S>(&self, source: &S) -> Result<Vec<Event>>
    where
        S: EventSource + ?Sized,
    {
        Drain::new(source, self.config.buffer_capacity).run(State::Draining)
    }
}

/// Poll `source` with the default configuration
pub fn poll_events<S>(source: &S, timeout: impl Into<Timeout>) -> Result<Vec<Event>>
where
    S: EventSource + ?Sized,
{
    Poller::default().poll(source, timeout)
}

/// Working state of one poll call
///
/// The read buffer lives exactly as long as the call.
pub(crate) struct Drain<'s, S: ?Sized> {
    source: &'s S,
    buffer: Vec<u8>,
    events: Vec<Event>,
    reads: usize,
}

impl<'s, S: EventSource + ?Sized> Drain<'s, S> {
    pub(crate) fn new(source: &'s S, capacity: usize) -> Self {
        Self {
            source,
            buffer: vec![0u8; capacity],
            events: Vec::new(),
            reads: 0,
        }
    }

    /// Step from `state` until a terminal state is reached
    pub(crate) fn run(mut self, mut state: State) -> Result<Vec<Event>> {
        loop {
            state = match self.step(state) {
                State::Done => {
                    debug!("Poll returned {} events in {} reads", self.events.len(), self.reads);
                    return Ok(self.events);
                }
                State::Failed(e) => {
                    debug!("Poll failed after {} reads: {}", self.reads, e);
                    return Err(e);
                }
                next => next,
            };
        }
    }

    fn step(&mut self, state: State) -> State {
        match state {
            State::Waiting(timeout) => match self.source.wait_readable(timeout) {
                Ok(true) => State::Draining,
                Ok(false) => State::Done,
                Err(e) => State::Failed(e),
            },
            State::Draining => self.drain_once(),
            terminal => terminal,
        }
    }

    /// One read, one decode, one non-blocking readiness re-check
    fn drain_once(&mut self) -> State {
        let len = match self.source.read_into(&mut self.buffer) {
            Ok(0) => {
                return State::Failed(Error::BufferTooSmall {
                    capacity: self.buffer.len(),
                })
            }
            Ok(len) => len,
            Err(e) => return State::Failed(e),
        };
        self.reads += 1;

        match decode_into(&self.buffer[..len], &mut self.events) {
            Ok(count) => trace!("Read {} bytes ({} events)", len, count),
            Err(e) => return State::Failed(e),
        }

        match self.source.wait_readable(Timeout::Immediate) {
            Ok(true) => State::Draining,
            Ok(false) => State::Done,
            Err(e) => {
                // Events are already in hand; report them and let the next
                // poll surface the error if it persists
                warn!("Readiness re-check failed, ending drain: {}", e);
                State::Done
            }
        }
    }
}
