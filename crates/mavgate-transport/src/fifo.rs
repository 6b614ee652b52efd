use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default location of the command FIFO.
pub const DEFAULT_FIFO_PATH: &str = "/tmp/mavgate_cmd_fifo";

/// Permission mode for a newly created FIFO.
pub const FIFO_MODE: u32 = 0o666;

/// Server side of the out-of-band command pipe.
///
/// Opened read-write and non-blocking: holding a write end keeps the pipe
/// from reporting EOF between senders, and reads never block the loop.
pub struct CommandFifo {
    file: File,
}

impl CommandFifo {
    /// Create the FIFO if needed and open it for the gateway.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_fifo(&path)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| TransportError::Fifo {
                path: path.clone(),
                source,
            })?;

        info!(?path, "command fifo ready");
        Ok(Self { file })
    }

    /// Open the FIFO as a sender.
    ///
    /// Fails with `NotFound` when the FIFO does not exist and with `ENXIO`
    /// when nothing holds the read end, i.e. no gateway is running.
    pub fn open_sender(path: impl AsRef<Path>) -> Result<File> {
        let path = path.as_ref();
        OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| TransportError::Fifo {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write one complete message to a running gateway.
    pub fn send(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let mut sender = Self::open_sender(path)?;
        sender
            .write_all(bytes)
            .map_err(|source| TransportError::Fifo {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(?path, len = bytes.len(), "wrote command to fifo");
        Ok(())
    }

    /// Non-blocking read. An empty pipe reads as zero bytes.
    pub fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(err) => return Err(err),
            }
        }
    }
}

impl AsRawFd for CommandFifo {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

fn ensure_fifo(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_fifo() => return Ok(()),
        Ok(_) => {
            return Err(TransportError::Fifo {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    "existing path is not a fifo",
                ),
            })
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(TransportError::Fifo {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| TransportError::Fifo {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "path contains a nul byte"),
    })?;

    // SAFETY: `c_path` is a valid nul-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), FIFO_MODE as libc::mode_t) };
    if rc != 0 {
        let source = std::io::Error::last_os_error();
        if source.kind() != ErrorKind::AlreadyExists {
            return Err(TransportError::Fifo {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    debug!(?path, "created command fifo");
    Ok(())
}
