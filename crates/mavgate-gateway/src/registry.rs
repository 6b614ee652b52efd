//! Connected repeater clients and commanding-client arbitration.
//!
//! Every connected client receives the flight controller's traffic. Exactly
//! one of them, the oldest still connected, may write to the serial link.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::os::fd::{AsRawFd, RawFd};

use tracing::{debug, info, warn};

pub type ClientId = u64;

/// Thresholds that govern when a commanding client is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationPolicy {
    /// Consecutive empty or failed reads tolerated from the commanding
    /// client. The read that reaches this count terminates it.
    pub max_empty_reads: u32,
}

impl Default for ArbitrationPolicy {
    fn default() -> Self {
        Self { max_empty_reads: 3 }
    }
}

#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub addr: SocketAddr,
    stream: TcpStream,
}

impl Client {
    pub fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.stream.read(buf) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

impl AsRawFd for Client {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

/// Clients in connection order, oldest first.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
    next_id: ClientId,
    commanding: Option<ClientId>,
    empty_reads: u32,
    policy: ArbitrationPolicy,
}

impl ClientRegistry {
    pub fn new(policy: ArbitrationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    /// Append a client to the tail. Returns its id.
    pub fn register(&mut self, stream: TcpStream, addr: SocketAddr) -> ClientId {
        let id = self.next_id;
        self.next_id += 1;
        self.clients.push(Client { id, addr, stream });
        info!(client = id, %addr, clients = self.clients.len(), "client connected");
        id
    }

    /// Remove and close a client. Unknown ids are ignored.
    pub fn terminate(&mut self, id: ClientId) {
        let Some(index) = self.clients.iter().position(|c| c.id == id) else {
            return;
        };
        let client = self.clients.remove(index);
        if let Err(err) = client.stream.shutdown(Shutdown::Both) {
            debug!(client = id, %err, "socket shutdown failed");
        }
        if self.commanding == Some(id) {
            self.commanding = None;
            self.empty_reads = 0;
        }
        info!(client = id, addr = %client.addr, clients = self.clients.len(), "client removed");
    }

    pub fn terminate_all(&mut self) {
        let ids = self.ids();
        for id in ids {
            self.terminate(id);
        }
    }

    /// Make the oldest client commanding if none is. Returns the newly
    /// elected id, or `None` if nothing changed.
    pub fn elect(&mut self) -> Option<ClientId> {
        if self.commanding.is_some() {
            return None;
        }
        let head = self.clients.first()?;
        self.commanding = Some(head.id);
        self.empty_reads = 0;
        info!(client = head.id, addr = %head.addr, "commanding client elected");
        self.commanding
    }

    pub fn commanding(&self) -> Option<ClientId> {
        self.commanding
    }

    pub fn commanding_client(&mut self) -> Option<&mut Client> {
        let id = self.commanding?;
        self.clients.iter_mut().find(|c| c.id == id)
    }

    /// Record an empty or failed read from the commanding client. Returns
    /// true when the policy threshold is reached.
    pub fn note_empty_read(&mut self) -> bool {
        self.empty_reads += 1;
        self.empty_reads >= self.policy.max_empty_reads
    }

    pub fn note_successful_read(&mut self) {
        self.empty_reads = 0;
    }

    /// Write `bytes` to every client in connection order. A client whose
    /// write fails is terminated; the others still receive the data.
    pub fn broadcast(&mut self, bytes: &[u8]) {
        let mut failed = Vec::new();
        for client in &mut self.clients {
            if let Err(err) = client.stream.write_all(bytes) {
                warn!(client = client.id, %err, "broadcast write failed");
                failed.push(client.id);
            }
        }
        for id in failed {
            self.terminate(id);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn ids(&self) -> Vec<ClientId> {
        self.clients.iter().map(|c| c.id).collect()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.iter().any(|c| c.id == id)
    }
}
