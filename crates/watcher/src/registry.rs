//! Watch registry
//!
//! Keeps the `wd -> path` mapping a consumer needs to make sense of events,
//! and forgets a watch once the kernel reports it as `IGNORED`.

use crate::channel::Channel;
use crate::config::PollConfig;
use crate::poll::Poller;
use crate::timeout::Timeout;
use notifyx_core::{Event, EventMask, Result, WatchDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An event together with the path of the watch that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedEvent {
    /// Watched path, `None` for events not tied to a known watch
    /// (queue overflow, or a watch removed behind the registry's back)
    pub path: Option<PathBuf>,
    pub event: Event,
}

impl WatchedEvent {
    /// Path of the entry the event is about
    ///
    /// The watched path joined with the child name, or the watched path
    /// itself for self events.
    pub fn subject(&self) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        Some(match &self.event.name {
            Some(name) => path.join(name),
            None => path.clone(),
        })
    }
}

/// A channel plus the paths of its watches
pub struct WatchRegistry {
    channel: Channel,
    poller: Poller,
    paths: HashMap<WatchDescriptor, PathBuf>,
}

impl WatchRegistry {
    pub fn new(channel: Channel, config: PollConfig) -> Self {
        Self {
            channel,
            poller: Poller::new(config),
            paths: HashMap::new(),
        }
    }

    /// Open a fresh channel with default settings
    pub fn open() -> Result<Self> {
        Ok(Self::new(Channel::create()?, PollConfig::default()))
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Watch `path`, remembering it for event resolution
    pub fn watch<P: AsRef<Path>>(&mut self, path: P, mask: EventMask) -> Result<WatchDescriptor> {
        let path = path.as_ref();
        let wd = self.channel.add_watch(path, mask)?;

        if let Some(previous) = self.paths.insert(wd, path.to_path_buf()) {
            if previous != path {
                debug!(
                    "Watch {} now known as {} (was {})",
                    wd,
                    path.display(),
                    previous.display()
                );
            }
        }
        Ok(wd)
    }

    /// Stop watching
    ///
    /// The path stays resolvable until the resulting `IGNORED` event has
    /// been polled.
    pub fn unwatch(&mut self, wd: WatchDescriptor) -> Result<()> {
        self.channel.remove_watch(wd)
    }

    /// Path registered for `wd`
    pub fn path(&self, wd: WatchDescriptor) -> Option<&Path> {
        self.paths.get(&wd).map(PathBuf::as_path)
    }

    /// Number of live watches
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Poll the channel and resolve each event to its watched path
    pub fn poll(&mut self, timeout: impl Into<Timeout>) -> Result<Vec<WatchedEvent>> {
        let events = self.poller.poll(&self.channel, timeout)?;
        Ok(self.resolve(events))
    }

    fn resolve(&mut self, events: Vec<Event>) -> Vec<WatchedEvent> {
        events
            .into_iter()
            .map(|event| {
                let path = if event.mask.contains(EventMask::IGNORED) {
                    self.paths.remove(&event.watch)
                } else {
                    self.paths.get(&event.watch).cloned()
                };

                if event.mask.contains(EventMask::Q_OVERFLOW) {
                    warn!("Event queue overflowed; events were lost");
                }

                WatchedEvent { path, event }
            })
            .collect()
    }
}
