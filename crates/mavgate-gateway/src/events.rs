//! The fixed set of file descriptors the loop waits on.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

pub const SLOT_SHUTDOWN: usize = 0;
pub const SLOT_TRANSPORT: usize = 1;
pub const SLOT_LISTENER: usize = 2;
pub const SLOT_COMMANDING: usize = 3;
pub const SLOT_COMMAND_QUEUE: usize = 4;
pub const SLOT_COUNT: usize = 5;

const HANGUP: libc::c_short = libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;

/// Ordered `pollfd` slots. An empty slot holds fd -1, which `poll(2)`
/// ignores.
pub struct EventSet {
    fds: [libc::pollfd; SLOT_COUNT],
}

impl Default for EventSet {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSet {
    pub fn new() -> Self {
        let empty = libc::pollfd {
            fd: -1,
            events: libc::POLLIN,
            revents: 0,
        };
        Self {
            fds: [empty; SLOT_COUNT],
        }
    }

    pub fn set(&mut self, slot: usize, fd: RawFd) {
        self.fds[slot].fd = fd;
        self.fds[slot].revents = 0;
    }

    pub fn clear(&mut self, slot: usize) {
        self.set(slot, -1);
    }

    pub fn fd(&self, slot: usize) -> Option<RawFd> {
        let fd = self.fds[slot].fd;
        (fd >= 0).then_some(fd)
    }

    /// Block until a slot is ready or `timeout` elapses (`None` waits
    /// forever). An interrupted wait reports zero ready slots.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        for pfd in &mut self.fds {
            pfd.revents = 0;
        }
        let timeout_ms = match timeout {
            Some(t) => libc::c_int::try_from(t.as_millis()).unwrap_or(libc::c_int::MAX),
            None => -1,
        };

        // SAFETY: `fds` is a live array of SLOT_COUNT initialized pollfd
        // structs, exclusively borrowed for the duration of the call.
        let rc = unsafe {
            libc::poll(
                self.fds.as_mut_ptr(),
                SLOT_COUNT as libc::nfds_t,
                timeout_ms,
            )
        };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(err);
        }
        Ok(rc as usize)
    }

    /// Data (or EOF) is available.
    pub fn readable(&self, slot: usize) -> bool {
        self.fds[slot].fd >= 0 && self.fds[slot].revents & libc::POLLIN != 0
    }

    /// The descriptor hung up or is in error.
    pub fn hangup(&self, slot: usize) -> bool {
        self.fds[slot].fd >= 0 && self.fds[slot].revents & HANGUP != 0
    }
}
