//! Notification channel and watch table
//!
//! A [`Channel`] owns one inotify descriptor. Watch registration and removal
//! forward straight to the kernel; no watch state is kept here.

use crate::poll::{self, EventSource};
use crate::timeout::Timeout;
use notifyx_core::{Error, Event, EventMask, Result, WatchDescriptor};
use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use tracing::debug;

/// An open inotify instance
///
/// Dropping the channel closes the descriptor. Only one poll may be in
/// flight on a channel at a time; `&self` methods do not serialize callers.
#[derive(Debug)]
pub struct Channel {
    fd: OwnedFd,
}

impl Channel {
    /// Open a new channel
    ///
    /// Fails if the per-user instance limit is reached or the kernel is out
    /// of memory.
    pub fn create() -> Result<Self> {
        let fd = unsafe { libc::inotify_init1(libc::IN_CLOEXEC) };
        if fd < 0 {
            return Err(Error::last_os_error("inotify_init1"));
        }

        debug!("Opened inotify channel (fd {})", fd);
        Ok(Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        })
    }

    /// Watch `path` for the events in `mask`
    ///
    /// Adding a path that is already watched returns the existing descriptor
    /// and replaces its mask (or extends it, with `MASK_ADD`).
    pub fn add_watch<P: AsRef<Path>>(&self, path: P, mask: EventMask) -> Result<WatchDescriptor> {
        let path = path.as_ref();
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| Error::InvalidPath {
            path: path.to_path_buf(),
        })?;

        let wd = unsafe { libc::inotify_add_watch(self.raw(), c_path.as_ptr(), mask.bits()) };
        if wd < 0 {
            return Err(Error::last_os_error("inotify_add_watch"));
        }

        debug!("Watching {} (wd {}, mask {})", path.display(), wd, mask);
        Ok(WatchDescriptor::from_raw(wd))
    }

    /// Watch `path` for every event category
    pub fn add_watch_all<P: AsRef<Path>>(&self, path: P) -> Result<WatchDescriptor> {
        self.add_watch(path, EventMask::default())
    }

    /// Stop watching
    ///
    /// The kernel queues an `IGNORED` event for the descriptor afterwards.
    pub fn remove_watch(&self, wd: WatchDescriptor) -> Result<()> {
        let rc = unsafe { libc::inotify_rm_watch(self.raw(), wd.as_raw()) };
        if rc < 0 {
            return Err(Error::last_os_error("inotify_rm_watch"));
        }

        debug!("Removed watch {}", wd);
        Ok(())
    }

    /// Wait for records to become readable
    ///
    /// Returns `false` if `timeout` elapsed first. Interruption by a signal
    /// is reported as an error, not retried.
    pub fn wait_readable(&self, timeout: Timeout) -> Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.raw(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ts = timeout.to_timespec();
        let ts_ptr = ts.as_ref().map_or(ptr::null(), |t| t as *const libc::timespec);

        let rc = unsafe { libc::ppoll(&mut pfd, 1, ts_ptr, ptr::null()) };
        if rc < 0 {
            return Err(Error::last_os_error("ppoll"));
        }
        if rc == 0 {
            return Ok(false);
        }

        if pfd.revents & libc::POLLNVAL != 0 {
            return Err(Error::Os {
                op: "ppoll",
                source: io::Error::from_raw_os_error(libc::EBADF),
            });
        }
        if pfd.revents & libc::POLLERR != 0 {
            return Err(Error::Os {
                op: "ppoll",
                source: io::Error::from_raw_os_error(libc::EIO),
            });
        }

        Ok(pfd.revents & libc::POLLIN != 0)
    }

    /// Read whole records into `buf`
    ///
    /// The kernel never splits a record across reads. A buffer too small for
    /// the next record is reported as `BufferTooSmall`, whether the kernel
    /// signals it with `EINVAL` or with a zero-byte read.
    pub fn read_into(&self, buf: &mut [u8]) -> Result<usize> {
        let n = unsafe { libc::read(self.raw(), buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()) };
        if n < 0 {
            let source = io::Error::last_os_error();
            if source.raw_os_error() == Some(libc::EINVAL) {
                return Err(Error::BufferTooSmall {
                    capacity: buf.len(),
                });
            }
            return Err(Error::Os { op: "read", source });
        }

        Ok(n as usize)
    }

    /// Return every event available within `timeout`, using default settings
    pub fn poll_events(&self, timeout: impl Into<Timeout>) -> Result<Vec<Event>> {
        poll::poll_events(self, timeout)
    }

    /// Close the descriptor, reporting any error from `close`
    pub fn close(self) -> Result<()> {
        let fd = self.fd.into_raw_fd();
        if unsafe { libc::close(fd) } < 0 {
            return Err(Error::last_os_error("close"));
        }
        Ok(())
    }

    fn raw(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl EventSource for Channel {
    fn wait_readable(&self, timeout: Timeout) -> Result<bool> {
        Channel::wait_readable(self, timeout)
    }

    fn read_into(&self, buf: &mut [u8]) -> Result<usize> {
        Channel::read_into(self, buf)
    }
}

impl AsFd for Channel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for Channel {
    fn as_raw_fd(&self) -> RawFd {
        self.raw()
    }
}

impl IntoRawFd for Channel {
    fn into_raw_fd(self) -> RawFd {
        self.fd.into_raw_fd()
    }
}

impl FromRawFd for Channel {
    /// Adopt an inotify descriptor opened elsewhere
    ///
    /// # Safety
    /// `fd` must be an open inotify descriptor owned by the caller.
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self {
            fd: OwnedFd::from_raw_fd(fd),
        }
    }
}

/// Open a new channel
pub fn channel_create() -> Result<Channel> {
    Channel::create()
}

/// Register a watch on `path`
pub fn watch_add<P: AsRef<Path>>(channel: &Channel, path: P, mask: EventMask) -> Result<WatchDescriptor> {
    channel.add_watch(path, mask)
}

/// Remove a watch
pub fn watch_remove(channel: &Channel, wd: WatchDescriptor) -> Result<()> {
    channel.remove_watch(wd)
}
