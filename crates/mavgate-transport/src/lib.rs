//! Transports used by the mavgate gateway.
//!
//! Three byte channels feed the gateway's readiness loop:
//! - the serial link to the flight controller ([`SerialStream`])
//! - the TCP listener that repeater clients connect to ([`TcpServer`])
//! - the named pipe used for out-of-band command injection ([`CommandFifo`])
//!
//! Every type here exposes its raw file descriptor so the loop can wait on
//! all of them with a single `poll(2)`.

pub mod error;
pub mod fifo;
pub mod serial;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use fifo::{CommandFifo, DEFAULT_FIFO_PATH};
pub use serial::{Parity, SerialConfig, StopBits};
pub use stream::SerialStream;
pub use tcp::{TcpServer, DEFAULT_PORT};
