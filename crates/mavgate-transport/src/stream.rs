use std::io::{Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::serial::{Parity, SerialConfig, StopBits};

/// Read timeout applied to the tty. Reads only happen after `poll(2)`
/// reported readiness, so this bounds the pathological case only.
const SERIAL_TIMEOUT: Duration = Duration::from_millis(1000);

/// A byte stream to the flight controller. Implements Read + Write.
///
/// On real hardware this wraps a configured tty. The loopback variant wraps
/// one end of a Unix socket pair and stands in for the device when the
/// gateway is driven by a simulator or by tests.
pub struct SerialStream {
    inner: SerialStreamInner,
}

enum SerialStreamInner {
    Tty(serialport::TTYPort),
    Loopback(UnixStream),
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SerialStreamInner::Tty(port) => port.read(buf),
            SerialStreamInner::Loopback(stream) => stream.read(buf),
        }
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SerialStreamInner::Tty(port) => port.write(buf),
            SerialStreamInner::Loopback(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            SerialStreamInner::Tty(port) => port.flush(),
            SerialStreamInner::Loopback(stream) => stream.flush(),
        }
    }
}

impl AsRawFd for SerialStream {
    fn as_raw_fd(&self) -> RawFd {
        match &self.inner {
            SerialStreamInner::Tty(port) => port.as_raw_fd(),
            SerialStreamInner::Loopback(stream) => stream.as_raw_fd(),
        }
    }
}

impl SerialStream {
    /// Open and configure the serial device at `path`.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref();
        let parity = match config.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
            other => {
                return Err(TransportError::UnsupportedSerialConfig(format!(
                    "parity {} is not supported by the serial backend",
                    other.as_str()
                )))
            }
        };
        let stop_bits = match config.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
            StopBits::OneAndHalf => {
                return Err(TransportError::UnsupportedSerialConfig(
                    "1.5 stop bits are not supported by the serial backend".to_string(),
                ))
            }
        };
        let data_bits = match config.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            _ => serialport::DataBits::Eight,
        };

        let port = serialport::new(path.to_string_lossy(), config.baudrate)
            .parity(parity)
            .stop_bits(stop_bits)
            .data_bits(data_bits)
            .flow_control(serialport::FlowControl::None)
            .timeout(SERIAL_TIMEOUT)
            .open_native()
            .map_err(|err| TransportError::Open {
                path: path.to_path_buf(),
                source: err.into(),
            })?;

        info!(?path, config = %config, "opened serial port");
        Ok(Self {
            inner: SerialStreamInner::Tty(port),
        })
    }

    /// Create a loopback link: the gateway side as a `SerialStream` and the
    /// device side as a plain socket.
    pub fn loopback_pair() -> Result<(Self, UnixStream)> {
        let (gateway, device) = UnixStream::pair()?;
        debug!("created loopback serial link");
        Ok((Self::from_loopback(gateway), device))
    }

    /// Wrap an already connected socket as a loopback serial link.
    pub fn from_loopback(stream: UnixStream) -> Self {
        Self {
            inner: SerialStreamInner::Loopback(stream),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// The gateway reads from one handle and writes through another.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            SerialStreamInner::Tty(port) => {
                let cloned = port.try_clone_native().map_err(std::io::Error::from)?;
                Ok(Self {
                    inner: SerialStreamInner::Tty(cloned),
                })
            }
            SerialStreamInner::Loopback(stream) => Ok(Self::from_loopback(stream.try_clone()?)),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            SerialStreamInner::Tty(_) => "tty",
            SerialStreamInner::Loopback(_) => "loopback",
        }
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("type", &self.transport_name())
            .field("fd", &self.as_raw_fd())
            .finish()
    }
}
