// src/channel/inotify.rs

use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::debug;

use super::NotifyChannel;
use crate::types::{EventMask, InitFlags, WatchId};

/// Linux inotify instance.
///
/// The descriptor is closed when this value is dropped.
#[derive(Debug)]
pub struct InotifyChannel {
    fd: OwnedFd,
}

impl InotifyChannel {
    /// Wrapper around `inotify_init1(2)`.
    pub fn open(flags: InitFlags) -> io::Result<Self> {
        // SAFETY: takes no pointers; the flag bits are `IN_NONBLOCK`/`IN_CLOEXEC` only.
        let fd = unsafe { libc::inotify_init1(flags.bits()) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(fd, ?flags, "opened inotify instance");

        // SAFETY: `fd` was just returned by the kernel and is owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { fd })
    }
}

impl AsRawFd for InotifyChannel {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl AsFd for InotifyChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl NotifyChannel for InotifyChannel {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: `c_path` is a NUL-terminated string that outlives the call,
        // and `self.fd` is an open inotify descriptor owned by `self`.
        let wd = unsafe {
            libc::inotify_add_watch(self.fd.as_raw_fd(), c_path.as_ptr(), mask.bits())
        };
        if wd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(WatchId(wd))
    }

    fn remove_watch(&mut self, id: WatchId) -> io::Result<()> {
        // SAFETY: plain integer arguments; the descriptor is owned by `self`.
        let rc = unsafe { libc::inotify_rm_watch(self.fd.as_raw_fd(), id.get()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn wait_readable(&mut self, timeout_ms: i32) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout = if timeout_ms < 0 { -1 } else { timeout_ms };

        // SAFETY: `pfd` is one valid, exclusively borrowed `pollfd` and the
        // count passed is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        if rc == 0 {
            return Ok(false);
        }
        if pfd.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            return Err(io::Error::other(format!(
                "poll reported revents {:#x} on inotify fd",
                pfd.revents
            )));
        }
        Ok(pfd.revents & libc::POLLIN != 0)
    }

    fn pending_bytes(&mut self) -> io::Result<usize> {
        let mut available: libc::c_int = 0;
        // SAFETY: FIONREAD writes a single `c_int` through the pointer, and
        // `available` is a live, writable `c_int`.
        let rc = unsafe { libc::ioctl(self.fd.as_raw_fd(), libc::FIONREAD, &mut available) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(available.max(0) as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: the kernel writes at most `buf.len()` bytes starting at
        // `buf.as_mut_ptr()`, which is valid and exclusively borrowed for the
        // whole call.
        let rc = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(rc as usize)
    }
}
