use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::crc16;
use crate::error::{FrameError, Result};

/// Start-of-frame marker.
pub const STX: [u8; 2] = [0x55, 0x66];

/// Frame header: stx (2) + ctrl (1) + length (2) + seq (2) + msg id (1).
pub const HEADER_SIZE: usize = 8;

/// Trailing checksum size.
pub const CRC_SIZE: usize = 2;

/// Default maximum payload accepted by the decoder.
pub const DEFAULT_MAX_PAYLOAD: usize = 255;

/// A validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Control byte. Opaque to the gateway.
    pub ctrl: u8,
    /// Sender sequence number.
    pub seq: u16,
    /// Message id.
    pub msg_id: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame with zero ctrl and sequence.
    pub fn new(msg_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            ctrl: 0,
            seq: 0,
            msg_id,
            payload: payload.into(),
        }
    }

    pub fn with_seq(mut self, seq: u16) -> Self {
        self.seq = seq;
        self
    }

    pub fn with_ctrl(mut self, ctrl: u8) -> Self {
        self.ctrl = ctrl;
        self
    }

    /// The total wire size of this frame (header + payload + crc).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬──────┬─────────┬─────────┬───────┬──────────┬──────────┐
/// │ STX (2B)  │ CTRL │ LEN     │ SEQ     │ MSGID │ Payload  │ CRC16    │
/// │ 0x55 0x66 │ (1B) │ (2B LE) │ (2B LE) │ (1B)  │ (LEN B)  │ (2B LE)  │
/// └───────────┴──────┴─────────┴─────────┴───────┴──────────┴──────────┘
/// ```
///
/// The checksum covers every byte from STX through the payload.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    let len = frame.payload.len();
    if len > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: u16::MAX as usize,
        });
    }

    let start = dst.len();
    dst.reserve(frame.wire_size());
    dst.put_slice(&STX);
    dst.put_u8(frame.ctrl);
    dst.put_u16_le(len as u16);
    dst.put_u16_le(frame.seq);
    dst.put_u8(frame.msg_id);
    dst.put_slice(&frame.payload);
    let crc = crc16(&dst[start..]);
    dst.put_u16_le(crc);
    Ok(())
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 255.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
