//! The gateway session: one readiness loop over every event source.
//!
//! Each iteration waits once, then services in fixed order: shutdown,
//! commanding-client hangup, commanding-client data, new connections,
//! serial data, the command queue, and finally re-election.

use std::io::{ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use mavgate_frame::message::{CommandLong, Ping};
use mavgate_frame::{Decoder, DecoderStats, Frame};
use mavgate_transport::{CommandFifo, SerialStream, TcpServer};
use tracing::{debug, info, warn};

use crate::actuation::{Device, DeviceState};
use crate::config::GatewayConfig;
use crate::dispatch::{DispatchTable, HandlerContext};
use crate::error::{GatewayError, Result};
use crate::events::{
    EventSet, SLOT_COMMANDING, SLOT_COMMAND_QUEUE, SLOT_LISTENER, SLOT_SHUTDOWN, SLOT_TRANSPORT,
};
use crate::handlers::RemoteReady;
use crate::heartbeat::HeartbeatTask;
use crate::link::{lock_writer, shared_writer, SharedWriter};
use crate::pidfile::PidFile;
use crate::queue::{CommandAccumulator, CommandRecord};
use crate::registry::{ArbitrationPolicy, ClientId, ClientRegistry};
use crate::shutdown::{Shutdown, ShutdownCause, ShutdownHandle};

/// Size of every socket, serial and FIFO read.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Interval between capability requests while waiting for the flight
/// controller.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(500);

/// A running gateway: the serial link, its TCP clients and the command queue.
pub struct Gateway {
    reader: SerialStream,
    writer: SharedWriter,
    server: TcpServer,
    fifo: Option<CommandFifo>,
    shutdown: Shutdown,
    registry: ClientRegistry,
    decoder: Decoder,
    dispatch: DispatchTable,
    device: Device,
    ready: RemoteReady,
    accumulator: CommandAccumulator,
    events: EventSet,
    heartbeat: Option<HeartbeatTask>,
    pid_file: Option<PidFile>,
    probe_remote: bool,
    wait_timeout: Option<Duration>,
    replies: Vec<Frame>,
    buf: [u8; READ_BUFFER_SIZE],
}

impl Gateway {
    /// Assemble a session over an open serial link and a bound listener.
    ///
    /// Signal handlers, the command FIFO, the pid file and the heartbeat are
    /// opt-in through the `with_*` builders.
    pub fn new(
        serial: SerialStream,
        server: TcpServer,
        mut device: Device,
        config: &GatewayConfig,
    ) -> Result<Self> {
        let writer = shared_writer(serial.try_clone()?);
        let shutdown = Shutdown::new()?;

        let mut events = EventSet::new();
        events.set(SLOT_SHUTDOWN, shutdown.as_raw_fd());
        events.set(SLOT_TRANSPORT, serial.as_raw_fd());
        events.set(SLOT_LISTENER, server.as_raw_fd());

        info!(
            transport = serial.transport_name(),
            port = server.port(),
            device = device.backend_name(),
            "gateway session created"
        );
        device.reset();

        Ok(Self {
            reader: serial,
            writer,
            server,
            fifo: None,
            shutdown,
            registry: ClientRegistry::default(),
            decoder: Decoder::new(),
            dispatch: DispatchTable::standard(config.rc, &config.device),
            device,
            ready: RemoteReady::default(),
            accumulator: CommandAccumulator::new(),
            events,
            heartbeat: None,
            pid_file: None,
            probe_remote: config.server.wait_for_remote,
            wait_timeout: None,
            replies: Vec::new(),
            buf: [0; READ_BUFFER_SIZE],
        })
    }

    /// Open every resource named by `config` and build a server-mode session.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let serial_config = config.serial_config()?;
        info!(summary = %serial_config.summary(), "serial line settings");
        let serial = SerialStream::open(config.serial_path()?, &serial_config)?;
        let server = TcpServer::bind(config.server.port)?;
        let device = Device::from_config(&config.device)?;
        let fifo = CommandFifo::create(&config.server.command_fifo)?;

        Self::new(serial, server, device, config)?
            .with_command_fifo(fifo)
            .with_signal_handlers()?
            .with_pid_file(&config.server.pid_file)?
            .start_heartbeat(config.heartbeat.period())
    }

    pub fn with_command_fifo(mut self, fifo: CommandFifo) -> Self {
        self.events.set(SLOT_COMMAND_QUEUE, fifo.as_raw_fd());
        self.fifo = Some(fifo);
        self
    }

    /// Route SIGINT, SIGTERM and SIGABRT into this session.
    pub fn with_signal_handlers(mut self) -> Result<Self> {
        self.shutdown.install_signal_handlers()?;
        Ok(self)
    }

    pub fn with_pid_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.pid_file = Some(PidFile::create(path)?);
        Ok(self)
    }

    /// Replace the arbitration thresholds. Call before serving clients.
    pub fn with_policy(mut self, policy: ArbitrationPolicy) -> Self {
        self.registry = ClientRegistry::new(policy);
        self
    }

    /// Bound each wait. `None` (the default) blocks until an event arrives.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Probe the flight controller before entering the loop.
    pub fn with_wait_for_remote(mut self, enabled: bool) -> Self {
        self.probe_remote = enabled;
        self
    }

    pub fn start_heartbeat(mut self, period: Duration) -> Result<Self> {
        let task = HeartbeatTask::spawn(self.writer.clone(), self.ready.clone(), period)?;
        self.heartbeat = Some(task);
        Ok(self)
    }

    /// Request capabilities until the flight controller answers, then greet
    /// it with a ping. Returns false if a shutdown arrived first; the
    /// pending shutdown is left for the loop to observe.
    pub fn wait_for_remote(&mut self) -> Result<bool> {
        let mut probe = EventSet::new();
        probe.set(SLOT_SHUTDOWN, self.shutdown.as_raw_fd());
        probe.set(SLOT_TRANSPORT, self.reader.as_raw_fd());

        info!("waiting for flight controller");
        let request = CommandLong::request_autopilot_capabilities();
        let mut last_probe: Option<Instant> = None;

        while !self.ready.is_ready() {
            if last_probe.is_none_or(|at| at.elapsed() >= PROBE_INTERVAL) {
                lock_writer(&self.writer).send_message(&request)?;
                last_probe = Some(Instant::now());
            }
            let next = last_probe
                .map(|at| PROBE_INTERVAL.saturating_sub(at.elapsed()))
                .unwrap_or(PROBE_INTERVAL);
            probe.wait(Some(next)).map_err(GatewayError::Poll)?;

            if probe.readable(SLOT_SHUTDOWN) {
                info!("shutdown while waiting for flight controller");
                return Ok(false);
            }
            let hangup = probe.hangup(SLOT_TRANSPORT);
            if probe.readable(SLOT_TRANSPORT) || hangup {
                self.service_transport(hangup)?;
            }
        }

        let ping = Ping {
            time_usec: unix_micros(),
            seq: 0,
            target_system: self.ready.system_id().unwrap_or(0),
            target_component: 0,
        };
        lock_writer(&self.writer).send_message(&ping)?;
        Ok(true)
    }

    /// Run one loop iteration. Returns the shutdown cause once a shutdown
    /// has been serviced.
    pub fn poll_once(&mut self) -> Result<Option<ShutdownCause>> {
        self.events
            .wait(self.wait_timeout)
            .map_err(GatewayError::Poll)?;

        if self.events.readable(SLOT_SHUTDOWN) {
            self.shutdown.drain();
            if let Some(cause) = self.shutdown.cause() {
                self.on_shutdown(cause);
                return Ok(Some(cause));
            }
        }

        self.service_commanding_client();

        if self.events.readable(SLOT_LISTENER) {
            self.accept_client();
        }

        let hangup = self.events.hangup(SLOT_TRANSPORT);
        if self.events.readable(SLOT_TRANSPORT) || hangup {
            self.service_transport(hangup)?;
        }

        if self.events.readable(SLOT_COMMAND_QUEUE) {
            self.service_command_queue();
        }

        self.registry.elect();
        self.sync_commanding_slot();
        Ok(None)
    }

    /// Loop until shutdown or a fatal error, then tear down.
    pub fn run(mut self) -> Result<ShutdownCause> {
        let outcome = self.serve();
        self.teardown();
        outcome
    }

    fn serve(&mut self) -> Result<ShutdownCause> {
        if self.probe_remote {
            self.wait_for_remote()?;
        }
        info!(port = self.server.port(), "serving");
        loop {
            if let Some(cause) = self.poll_once()? {
                return Ok(cause);
            }
        }
    }

    fn on_shutdown(&mut self, cause: ShutdownCause) {
        info!(cause = cause.as_str(), "shutting down");
        match cause {
            ShutdownCause::Interrupt => self.device.finish_recording(),
            ShutdownCause::Terminate | ShutdownCause::Requested => {
                if let Some(pid_file) = self.pid_file.take() {
                    if let Err(err) = pid_file.remove() {
                        warn!(%err, "failed to remove pid file");
                    }
                }
            }
        }
    }

    fn service_commanding_client(&mut self) {
        let Some(id) = self.registry.commanding() else {
            return;
        };

        if self.events.hangup(SLOT_COMMANDING) {
            info!(client = id, "commanding client hung up");
            self.drop_commanding(id);
            return;
        }
        if !self.events.readable(SLOT_COMMANDING) {
            return;
        }

        let read = match self.registry.commanding_client() {
            Some(client) => client.read(&mut self.buf),
            None => return,
        };
        match read {
            Ok(n) if n > 0 => {
                self.registry.note_successful_read();
                if let Err(err) = lock_writer(&self.writer).write_raw(&self.buf[..n]) {
                    warn!(client = id, %err, "failed to forward client bytes to serial");
                }
            }
            Ok(_) => self.empty_read(id),
            Err(err) => {
                debug!(client = id, %err, "commanding client read failed");
                self.empty_read(id);
            }
        }
    }

    fn empty_read(&mut self, id: ClientId) {
        if self.registry.note_empty_read() {
            warn!(
                client = id,
                limit = self.registry.policy().max_empty_reads,
                "commanding client stopped sending, dropping it"
            );
            self.drop_commanding(id);
        }
    }

    fn drop_commanding(&mut self, id: ClientId) {
        self.registry.terminate(id);
        self.events.clear(SLOT_COMMANDING);
    }

    fn accept_client(&mut self) {
        match self.server.accept() {
            Ok((stream, addr)) => {
                self.registry.register(stream, addr);
            }
            Err(err) => warn!(%err, "failed to accept client"),
        }
    }

    /// Read one chunk from the serial link. End of file, or a failed read
    /// after `hangup` was reported, closes the session; any other read
    /// error is logged and the loop carries on.
    fn service_transport(&mut self, hangup: bool) -> Result<()> {
        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if hangup => {
                    warn!(%err, "serial link hung up");
                    return Err(GatewayError::TransportClosed);
                }
                Err(err) => {
                    warn!(%err, "serial read failed");
                    return Ok(());
                }
            }
        };
        if n == 0 {
            warn!("serial link reported end of file");
            return Err(GatewayError::TransportClosed);
        }

        let Self {
            buf,
            decoder,
            dispatch,
            device,
            replies,
            ready,
            ..
        } = self;
        decoder.feed_slice(&buf[..n], |frame| {
            let mut ctx = HandlerContext {
                device: &mut *device,
                replies: &mut *replies,
                remote_ready: &*ready,
            };
            dispatch.dispatch(&frame, &mut ctx);
        });

        if !self.replies.is_empty() {
            let mut writer = lock_writer(&self.writer);
            for frame in self.replies.drain(..) {
                if let Err(err) = writer.send_frame(frame) {
                    warn!(%err, "failed to send reply");
                }
            }
        }

        self.registry.broadcast(&self.buf[..n]);
        Ok(())
    }

    fn service_command_queue(&mut self) {
        let Some(fifo) = self.fifo.as_mut() else {
            return;
        };
        match fifo.read(self.accumulator.spare_mut()) {
            Ok(n) => {
                if let Some(record) = self.accumulator.advance(n) {
                    self.execute(record);
                }
            }
            Err(err) => warn!(%err, "command fifo read failed"),
        }
    }

    fn execute(&mut self, record: CommandRecord) {
        let Some(frame) = record.to_frame() else {
            return;
        };
        if let Err(err) = lock_writer(&self.writer).send_frame(frame) {
            warn!(%err, kind = record.kind, "failed to send queued command");
        }
    }

    fn sync_commanding_slot(&mut self) {
        match self.registry.commanding_client().map(|c| c.as_raw_fd()) {
            Some(fd) => self.events.set(SLOT_COMMANDING, fd),
            None => self.events.clear(SLOT_COMMANDING),
        }
    }

    fn teardown(self) {
        let Self {
            mut registry,
            shutdown,
            fifo,
            reader,
            writer,
            heartbeat,
            ..
        } = self;

        registry.terminate_all();
        drop(shutdown);
        drop(fifo);
        drop(reader);
        drop(writer);
        if let Some(task) = heartbeat {
            task.stop();
        }
        info!("gateway stopped");
    }

    /// The bound TCP port.
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    pub fn commanding(&self) -> Option<ClientId> {
        self.registry.commanding()
    }

    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Frames that decoded but had no handler.
    pub fn unknown_count(&self) -> u64 {
        self.dispatch.unknown_count()
    }

    pub fn device_state(&self) -> DeviceState {
        self.device.state()
    }

    pub fn remote_ready(&self) -> RemoteReady {
        self.ready.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.handle()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("port", &self.server.port())
            .field("clients", &self.registry.len())
            .field("commanding", &self.registry.commanding())
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

fn unix_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
