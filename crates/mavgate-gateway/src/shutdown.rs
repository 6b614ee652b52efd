//! Signal interception and the shutdown self-pipe.
//!
//! Signal handlers only set per-cause flags and write one byte into a
//! socket pair. The loop waits on the read end like any other descriptor,
//! so shutdown is observed at the single wait point.

use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::signal::{SIGABRT, SIGINT, SIGTERM};
use signal_hook::SigId;
use tracing::{debug, info};

use crate::error::{GatewayError, Result};

/// Why the loop is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// SIGINT.
    Interrupt,
    /// SIGTERM or SIGABRT.
    Terminate,
    /// [`ShutdownHandle::trigger`].
    Requested,
}

impl ShutdownCause {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
            Self::Requested => "requested",
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    interrupt: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    requested: Arc<AtomicBool>,
}

/// Loop side of the self-pipe.
#[derive(Debug)]
pub struct Shutdown {
    read: UnixStream,
    write: Arc<UnixStream>,
    flags: Flags,
    signals: Vec<SigId>,
}

impl Shutdown {
    pub fn new() -> Result<Self> {
        let (read, write) = UnixStream::pair()?;
        read.set_nonblocking(true)?;
        write.set_nonblocking(true)?;
        Ok(Self {
            read,
            write: Arc::new(write),
            flags: Flags::default(),
            signals: Vec::new(),
        })
    }

    /// Route SIGINT, SIGTERM and SIGABRT into the self-pipe.
    pub fn install_signal_handlers(&mut self) -> Result<()> {
        let routes = [
            (SIGINT, &self.flags.interrupt),
            (SIGTERM, &self.flags.terminate),
            (SIGABRT, &self.flags.terminate),
        ];
        for (signal, flag) in routes {
            let id = signal_hook::flag::register(signal, Arc::clone(flag))
                .map_err(GatewayError::Signal)?;
            self.signals.push(id);
            let pipe = self.write.try_clone().map_err(GatewayError::Signal)?;
            let id = signal_hook::low_level::pipe::register(signal, pipe)
                .map_err(GatewayError::Signal)?;
            self.signals.push(id);
        }
        debug!("signal handlers installed");
        Ok(())
    }

    /// A handle that can stop the loop from any thread.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            write: Arc::clone(&self.write),
            requested: Arc::clone(&self.flags.requested),
        }
    }

    /// Consume pending wake-up bytes.
    pub fn drain(&mut self) {
        let mut buf = [0u8; 64];
        loop {
            match self.read.read(&mut buf) {
                Ok(0) => return,
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return,
            }
        }
    }

    /// The cause recorded by the handlers, if any. Interrupt takes
    /// precedence over terminate, terminate over a programmatic request.
    pub fn cause(&self) -> Option<ShutdownCause> {
        if self.flags.interrupt.load(Ordering::SeqCst) {
            Some(ShutdownCause::Interrupt)
        } else if self.flags.terminate.load(Ordering::SeqCst) {
            Some(ShutdownCause::Terminate)
        } else if self.flags.requested.load(Ordering::SeqCst) {
            Some(ShutdownCause::Requested)
        } else {
            None
        }
    }
}

impl AsRawFd for Shutdown {
    fn as_raw_fd(&self) -> RawFd {
        self.read.as_raw_fd()
    }
}

impl Drop for Shutdown {
    fn drop(&mut self) {
        for id in self.signals.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

/// Requests a graceful stop of the loop.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    write: Arc<UnixStream>,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        // A full pipe already holds a pending wake-up.
        match (&*self.write).write(&[1]) {
            Ok(_) => info!("shutdown requested"),
            Err(err) if err.kind() == ErrorKind::WouldBlock => {}
            Err(err) => debug!(%err, "shutdown wake-up write failed"),
        }
    }
}
