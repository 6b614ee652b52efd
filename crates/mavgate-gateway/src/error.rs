use std::path::PathBuf;

/// Errors that can occur while configuring or running the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mavgate_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] mavgate_frame::FrameError),

    /// The configuration is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Waiting for events failed with something other than EINTR.
    #[error("event wait failed: {0}")]
    Poll(#[source] std::io::Error),

    /// The serial link reported end-of-file or hangup.
    #[error("serial link closed")]
    TransportClosed,

    /// The pid marker file could not be written, read, or removed.
    #[error("pid file {path}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signal handlers could not be installed.
    #[error("signal setup failed: {0}")]
    Signal(#[source] std::io::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
