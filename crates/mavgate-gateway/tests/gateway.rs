//! End-to-end session behavior over a loopback serial link.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use mavgate_frame::message::{
    command, result, AutopilotVersion, CameraInformation, CommandAck, CommandLong, Message,
    PlayTune, RcChannels,
};
use mavgate_frame::{encode_frame, Decoder, Frame};
use mavgate_gateway::{
    tunes, Backend, Camera, CommandRecord, Device, Gateway, GatewayConfig, GatewayError, Gimbal,
    ShutdownCause,
};
use mavgate_transport::{CommandFifo, SerialStream, TcpServer};

const TICK: Duration = Duration::from_millis(20);

fn gateway() -> (Gateway, UnixStream) {
    let (serial, fcu) = SerialStream::loopback_pair().unwrap();
    let server = TcpServer::bind(0).unwrap();
    let gateway = Gateway::new(serial, server, Device::null(), &GatewayConfig::default())
        .unwrap()
        .with_wait_timeout(Some(TICK));
    (gateway, fcu)
}

fn pump_until(gateway: &mut Gateway, mut done: impl FnMut(&Gateway) -> bool) {
    for _ in 0..250 {
        assert_eq!(gateway.poll_once().unwrap(), None);
        if done(gateway) {
            return;
        }
    }
    panic!("condition not reached: {gateway:?}");
}

fn pump(gateway: &mut Gateway, iterations: usize) {
    for _ in 0..iterations {
        assert_eq!(gateway.poll_once().unwrap(), None);
    }
}

fn connect(gateway: &mut Gateway) -> TcpStream {
    let before = gateway.client_count();
    let stream = TcpStream::connect(("127.0.0.1", gateway.port())).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    pump_until(gateway, |g| g.client_count() == before + 1);
    stream
}

fn wire(frame: &Frame) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_frame(frame, &mut buf).unwrap();
    buf.to_vec()
}

fn send<M: Message>(fcu: &mut UnixStream, message: &M) {
    fcu.write_all(&wire(&message.to_frame())).unwrap();
}

fn drain(stream: &mut UnixStream, wait: Duration) -> Vec<u8> {
    let deadline = Instant::now() + wait;
    let mut out = Vec::new();
    let mut buf = [0u8; 512];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return out;
        }
        stream.set_read_timeout(Some(remaining)).unwrap();
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return out,
            Ok(n) => out.extend_from_slice(&buf[..n]),
        }
    }
}

fn frames(bytes: &[u8]) -> Vec<Frame> {
    let mut decoder = Decoder::new();
    let mut out = Vec::new();
    decoder.feed_slice(bytes, |f| out.push(f));
    out
}

fn temp_path(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "mavgate-session-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Rotate(i16, i16),
    Zoom(u8, u8),
    Center,
    Snapshot,
    Toggle,
    Finish,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    fn push(&self, call: Call) -> mavgate_gateway::Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl Gimbal for Recorder {
    fn rotate(&mut self, yaw: i16, pitch: i16) -> mavgate_gateway::Result<()> {
        self.push(Call::Rotate(yaw, pitch))
    }
    fn set_zoom(&mut self, integer: u8, decimal: u8) -> mavgate_gateway::Result<()> {
        self.push(Call::Zoom(integer, decimal))
    }
    fn center(&mut self) -> mavgate_gateway::Result<()> {
        self.push(Call::Center)
    }
}

impl Camera for Recorder {
    fn save_snapshot(&mut self) -> mavgate_gateway::Result<()> {
        self.push(Call::Snapshot)
    }
    fn toggle_recording(&mut self) -> mavgate_gateway::Result<()> {
        self.push(Call::Toggle)
    }
    fn finish_recording(&mut self) -> mavgate_gateway::Result<()> {
        self.push(Call::Finish)
    }
}

impl Backend for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[test]
fn session_starts_with_gimbal_reset() {
    let recorder = Recorder::default();
    let (serial, _fcu) = SerialStream::loopback_pair().unwrap();
    let server = TcpServer::bind(0).unwrap();
    let device = Device::new(Box::new(recorder.clone()));

    let gw = Gateway::new(serial, server, device, &GatewayConfig::default()).unwrap();
    assert_eq!(
        *recorder.calls.lock().unwrap(),
        [Call::Center, Call::Zoom(1, 0)]
    );
    assert_eq!(gw.device_state(), Device::null().state());
}

#[test]
fn oldest_client_commands_and_successor_takes_over() {
    let (mut gw, _fcu) = gateway();
    let a = connect(&mut gw);
    assert_eq!(gw.commanding(), Some(0));
    let _b = connect(&mut gw);
    assert_eq!(gw.commanding(), Some(0), "newer client never preempts");

    drop(a);
    pump_until(&mut gw, |g| g.commanding() == Some(1));
    assert_eq!(gw.client_count(), 1);
}

#[test]
fn only_commanding_client_reaches_serial() {
    let (mut gw, mut fcu) = gateway();
    let mut a = connect(&mut gw);
    let mut b = connect(&mut gw);

    b.write_all(b"from-b").unwrap();
    a.write_all(b"from-a").unwrap();
    pump(&mut gw, 5);

    assert_eq!(drain(&mut fcu, Duration::from_millis(100)), b"from-a");
}

#[test]
fn serial_traffic_is_broadcast_and_unknown_ids_only_counted() {
    let (mut gw, mut fcu) = gateway();
    let mut clients = [connect(&mut gw), connect(&mut gw)];

    let mut bytes = vec![0x13];
    bytes.extend(wire(&Frame::new(200, vec![1, 2, 3]).with_seq(9)));
    fcu.write_all(&bytes).unwrap();
    pump_until(&mut gw, |g| g.unknown_count() == 1);

    assert_eq!(gw.decoder_stats().frames, 1);
    assert_eq!(gw.device_state(), Device::null().state());
    for client in &mut clients {
        let mut received = vec![0u8; bytes.len()];
        client.read_exact(&mut received).unwrap();
        assert_eq!(received, bytes);
    }
    assert!(
        drain(&mut fcu, Duration::from_millis(50)).is_empty(),
        "unknown frames produce no reply"
    );
}

#[test]
fn rc_channels_drive_the_gimbal() {
    let (mut gw, mut fcu) = gateway();
    let mut rc = RcChannels::default();
    rc.chan_raw = [1500; 18];
    rc.set_channel(1, 2000);
    for button in [5, 13, 14] {
        rc.set_channel(button, 1000);
    }

    for _ in 0..5 {
        send(&mut fcu, &rc);
    }
    pump_until(&mut gw, |g| g.decoder_stats().frames == 5);

    let state = gw.device_state();
    assert!(state.yaw > 0, "yaw should accumulate: {state:?}");
    assert_eq!(state.pitch, 0);
    assert_eq!(state.snapshots, 0, "first frame only latches buttons");
    assert!(!state.recording);
}

#[test]
fn command_long_is_acknowledged_before_reply() {
    let (mut gw, mut fcu) = gateway();
    send(
        &mut fcu,
        &CommandLong::new(command::REQUEST_CAMERA_INFORMATION),
    );
    pump_until(&mut gw, |g| g.decoder_stats().frames == 1);

    let replies = frames(&drain(&mut fcu, Duration::from_millis(200)));
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].msg_id, CommandAck::ID);
    let ack = CommandAck::decode(&replies[0].payload);
    assert_eq!(ack.command, command::REQUEST_CAMERA_INFORMATION);
    assert_eq!(ack.result, result::ACCEPTED);
    assert_eq!(replies[1].msg_id, CameraInformation::ID);
    assert_eq!(replies[1].seq, replies[0].seq.wrapping_add(1));
}

#[test]
fn unsupported_command_is_nacked() {
    let (mut gw, mut fcu) = gateway();
    send(&mut fcu, &CommandLong::new(4242));
    pump_until(&mut gw, |g| g.decoder_stats().frames == 1);

    let replies = frames(&drain(&mut fcu, Duration::from_millis(200)));
    assert_eq!(replies.len(), 1);
    let ack = CommandAck::decode(&replies[0].payload);
    assert_eq!(ack.result, result::UNSUPPORTED);
}

#[test]
fn split_command_record_plays_one_tune() {
    let dir = temp_path("fifo");
    let path = dir.join("cmd_fifo");
    let (gw, mut fcu) = gateway();
    let mut gw = gw.with_command_fifo(CommandFifo::create(&path).unwrap());

    let record = CommandRecord::play_tune(3).to_bytes();
    let mut sender = CommandFifo::open_sender(&path).unwrap();
    sender.write_all(&record[..7]).unwrap();
    pump(&mut gw, 3);
    assert!(drain(&mut fcu, Duration::from_millis(50)).is_empty());

    sender.write_all(&record[7..]).unwrap();
    pump(&mut gw, 3);

    let sent = frames(&drain(&mut fcu, Duration::from_millis(200)));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].msg_id, PlayTune::ID);
    assert!(!PlayTune::decode(&sent[0].payload).tune.is_empty());

    drop(gw);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn command_record_sent_one_byte_at_a_time_plays_once() {
    let dir = temp_path("fifo-bytes");
    let path = dir.join("cmd_fifo");
    let (gw, mut fcu) = gateway();
    let mut gw = gw.with_command_fifo(CommandFifo::create(&path).unwrap());

    let mut sender = CommandFifo::open_sender(&path).unwrap();
    for byte in CommandRecord::play_tune(7).to_bytes() {
        sender.write_all(&[byte]).unwrap();
        pump(&mut gw, 1);
    }
    pump(&mut gw, 2);

    let sent = frames(&drain(&mut fcu, Duration::from_millis(200)));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].msg_id, PlayTune::ID);
    let played = PlayTune::decode(&sent[0].payload);
    assert_eq!(played.tune, tunes::tune(7).unwrap());

    drop(gw);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn out_of_range_tune_is_ignored() {
    let dir = temp_path("tune-range");
    let path = dir.join("cmd_fifo");
    let (gw, mut fcu) = gateway();
    let mut gw = gw.with_command_fifo(CommandFifo::create(&path).unwrap());

    CommandFifo::send(&path, &CommandRecord::play_tune(99).to_bytes()).unwrap();
    pump(&mut gw, 3);
    assert!(drain(&mut fcu, Duration::from_millis(50)).is_empty());

    drop(gw);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn shutdown_request_ends_run_and_removes_pid_file() {
    let dir = temp_path("pid");
    let pid_path = dir.join("mavgate.pid");
    let (gw, _fcu) = gateway();
    let gw = gw.with_pid_file(&pid_path).unwrap();
    assert!(pid_path.exists());

    let handle = gw.shutdown_handle();
    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        handle.trigger();
    });

    assert_eq!(gw.run().unwrap(), ShutdownCause::Requested);
    trigger.join().unwrap();
    assert!(!pid_path.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn teardown_disconnects_clients() {
    let (mut gw, _fcu) = gateway();
    let mut client = connect(&mut gw);
    gw.shutdown_handle().trigger();
    assert_eq!(gw.run().unwrap(), ShutdownCause::Requested);

    let mut buf = [0u8; 1];
    assert_eq!(client.read(&mut buf).unwrap(), 0);
}

#[test]
fn closed_serial_link_is_fatal() {
    let (gw, fcu) = gateway();
    drop(fcu);
    assert!(matches!(gw.run(), Err(GatewayError::TransportClosed)));
}

#[test]
fn wait_for_remote_probes_until_autopilot_answers() {
    let (mut gw, mut fcu) = gateway();

    let autopilot = std::thread::spawn(move || {
        let mut decoder = Decoder::new();
        let mut seen = Vec::new();
        let mut buf = [0u8; 256];
        fcu.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        while seen.is_empty() {
            let n = fcu.read(&mut buf).unwrap();
            decoder.feed_slice(&buf[..n], |f| seen.push(f));
        }
        let probe = CommandLong::decode(&seen[0].payload);
        send(
            &mut fcu,
            &AutopilotVersion {
                capabilities: 0,
                flight_sw_version: 0,
                middleware_sw_version: 0,
                os_sw_version: 0,
                board_version: 0,
                system_id: 7,
            },
        );
        (seen[0].msg_id, probe.command, fcu)
    });

    assert!(gw.wait_for_remote().unwrap());
    let (msg_id, probed, mut fcu) = autopilot.join().unwrap();
    assert_eq!(msg_id, CommandLong::ID);
    assert_eq!(probed, command::REQUEST_AUTOPILOT_CAPABILITIES);
    assert_eq!(gw.remote_ready().system_id(), Some(7));

    let greeting = frames(&drain(&mut fcu, Duration::from_millis(200)));
    assert!(greeting.iter().any(|f| f.msg_id == mavgate_frame::msgid::PING));
}

#[test]
fn wait_for_remote_yields_to_shutdown() {
    let (mut gw, _fcu) = gateway();
    gw.shutdown_handle().trigger();
    assert!(!gw.wait_for_remote().unwrap());
    assert_eq!(gw.poll_once().unwrap(), Some(ShutdownCause::Requested));
}
