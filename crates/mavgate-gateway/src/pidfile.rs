use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{GatewayError, Result};

/// Default location of the pid marker file.
pub const DEFAULT_PID_FILE: &str = "/tmp/mavgate.pid";

/// Process-id marker for a running server.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Write the current process id to `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::write(&path, format!("{}\n", std::process::id())).map_err(|source| {
            GatewayError::PidFile {
                path: path.clone(),
                source,
            }
        })?;
        info!(?path, pid = std::process::id(), "wrote pid file");
        Ok(Self { path })
    }

    /// Read the pid recorded at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<i32> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GatewayError::PidFile {
            path: path.to_path_buf(),
            source,
        })?;
        text.trim()
            .parse::<i32>()
            .ok()
            .filter(|pid| *pid > 0)
            .ok_or_else(|| GatewayError::PidFile {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("not a process id: {:?}", text.trim()),
                ),
            })
    }

    /// Delete the marker. A marker that is already gone is not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "removed pid file");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(GatewayError::PidFile {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
