//! SIYI gimbal camera over UDP.
//!
//! SIYI cameras speak the same framed protocol as the flight link: STX,
//! ctrl, length, sequence, command id, payload and CRC16. Commands are sent
//! fire-and-forget.

use std::net::{Ipv4Addr, ToSocketAddrs, UdpSocket};

use bytes::BytesMut;
use mavgate_frame::{encode_frame, Frame};
use tracing::{info, trace};

use crate::actuation::{Backend, Camera, Gimbal};
use crate::error::Result;

pub const DEFAULT_SIYI_IP: &str = "192.168.144.25";
pub const DEFAULT_SIYI_PORT: u16 = 37260;

/// Ctrl byte for commands that do not request an acknowledgement.
const CTRL_NO_ACK: u8 = 1;

const CMD_CENTER: u8 = 0x08;
const CMD_PHOTO_RECORD: u8 = 0x0C;
const CMD_ROTATE: u8 = 0x0E;
const CMD_ZOOM: u8 = 0x0F;

const FUNC_TAKE_PHOTO: u8 = 0;
const FUNC_TOGGLE_RECORD: u8 = 2;

pub struct SiyiGimbal {
    socket: UdpSocket,
    seq: u16,
    buf: BytesMut,
}

impl SiyiGimbal {
    /// Open a UDP socket connected to the camera.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(addr)?;
        info!(peer = ?socket.peer_addr().ok(), "siyi camera connected");
        Ok(Self {
            socket,
            seq: 0,
            buf: BytesMut::with_capacity(32),
        })
    }

    fn send(&mut self, cmd: u8, payload: &[u8]) -> Result<()> {
        let frame = Frame::new(cmd, payload.to_vec())
            .with_ctrl(CTRL_NO_ACK)
            .with_seq(self.seq);
        self.buf.clear();
        encode_frame(&frame, &mut self.buf)?;
        self.socket.send(&self.buf)?;
        trace!(cmd, seq = self.seq, "sent siyi command");
        self.seq = self.seq.wrapping_add(1);
        Ok(())
    }
}

impl Gimbal for SiyiGimbal {
    fn rotate(&mut self, yaw: i16, pitch: i16) -> Result<()> {
        let mut payload = [0u8; 4];
        payload[..2].copy_from_slice(&yaw.to_le_bytes());
        payload[2..].copy_from_slice(&pitch.to_le_bytes());
        self.send(CMD_ROTATE, &payload)
    }

    fn set_zoom(&mut self, integer: u8, decimal: u8) -> Result<()> {
        self.send(CMD_ZOOM, &[integer, decimal])
    }

    fn center(&mut self) -> Result<()> {
        self.send(CMD_CENTER, &[1])
    }
}

impl Camera for SiyiGimbal {
    fn save_snapshot(&mut self) -> Result<()> {
        self.send(CMD_PHOTO_RECORD, &[FUNC_TAKE_PHOTO])
    }

    fn toggle_recording(&mut self) -> Result<()> {
        self.send(CMD_PHOTO_RECORD, &[FUNC_TOGGLE_RECORD])
    }

    // Recordings are written on the camera's own storage.
    fn finish_recording(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Backend for SiyiGimbal {
    fn name(&self) -> &'static str {
        "siyi"
    }
}
