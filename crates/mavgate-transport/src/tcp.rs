use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::os::fd::{AsRawFd, RawFd};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default TCP port the gateway serves on.
pub const DEFAULT_PORT: u16 = 8278;

/// TCP listener for repeater clients.
///
/// Accept is only called after the readiness loop reported the listener
/// readable, so the blocking `accept(2)` returns immediately.
pub struct TcpServer {
    listener: TcpListener,
    port: u16,
}

impl TcpServer {
    /// Bind on all IPv4 interfaces. Port 0 picks an ephemeral port.
    pub fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        let listener =
            TcpListener::bind(addr).map_err(|source| TransportError::Bind { port, source })?;
        let port = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { port, source })?
            .port();

        info!(port, "listening for tcp clients");
        Ok(Self { listener, port })
    }

    /// Accept one pending connection.
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%addr, "accepted tcp connection");
        Ok((stream, addr))
    }

    /// The bound port (resolved when bound with port 0).
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl AsRawFd for TcpServer {
    fn as_raw_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }
}
