use std::path::PathBuf;

/// Errors that can occur in gateway transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open serial port {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to bind the TCP listener.
    #[error("failed to bind to port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// Failed to create or open the command FIFO.
    #[error("command fifo {path}: {source}")]
    Fifo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial configuration string could not be parsed.
    #[error("invalid serial configuration: {0}")]
    InvalidSerialConfig(String),

    /// The serial configuration parsed but the serial backend cannot apply it.
    #[error("unsupported serial configuration: {0}")]
    UnsupportedSerialConfig(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
