//! Byte-at-a-time frame decoder.
//!
//! The decoder never buffers more than one frame: bytes are fed one by one,
//! and a frame is returned only once its trailing checksum has been verified.
//! A checksum mismatch or an oversized length silently drops the candidate
//! frame and returns the decoder to hunting for STX.

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::codec::{Frame, FrameConfig, HEADER_SIZE, STX};
use crate::crc::crc16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stx0,
    Stx1,
    Ctrl,
    LenLow,
    LenHigh,
    SeqLow,
    SeqHigh,
    MsgId,
    Payload,
    CrcLow,
    CrcHigh,
}

/// Counters kept across frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames emitted.
    pub frames: u64,
    /// Complete frames dropped on checksum mismatch.
    pub crc_errors: u64,
    /// Headers dropped because the declared length exceeded the maximum.
    pub oversize: u64,
}

/// Parse state for one byte channel.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    // STX through payload of the frame being assembled.
    buf: BytesMut,
    len: usize,
    crc_low: u8,
    config: FrameConfig,
    stats: DecoderStats,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: State::Stx0,
            buf: BytesMut::with_capacity(HEADER_SIZE + config.max_payload_size),
            len: 0,
            crc_low: 0,
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte. Returns a frame when this byte completes a valid one.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            State::Stx0 => {
                if byte == STX[0] {
                    self.buf.clear();
                    self.buf.extend_from_slice(&[byte]);
                    self.state = State::Stx1;
                }
            }
            State::Stx1 => {
                if byte == STX[1] {
                    self.push(byte, State::Ctrl);
                } else {
                    self.reset();
                    // The offending byte may itself start the next frame.
                    if byte == STX[0] {
                        self.buf.extend_from_slice(&[byte]);
                        self.state = State::Stx1;
                    }
                }
            }
            State::Ctrl => self.push(byte, State::LenLow),
            State::LenLow => {
                self.len = byte as usize;
                self.push(byte, State::LenHigh);
            }
            State::LenHigh => {
                self.len |= (byte as usize) << 8;
                if self.len > self.config.max_payload_size {
                    self.stats.oversize += 1;
                    debug!(
                        len = self.len,
                        max = self.config.max_payload_size,
                        "declared payload too large, resyncing"
                    );
                    self.reset();
                } else {
                    self.push(byte, State::SeqLow);
                }
            }
            State::SeqLow => self.push(byte, State::SeqHigh),
            State::SeqHigh => self.push(byte, State::MsgId),
            State::MsgId => {
                let next = if self.len == 0 {
                    State::CrcLow
                } else {
                    State::Payload
                };
                self.push(byte, next);
            }
            State::Payload => {
                let next = if self.buf.len() + 1 == HEADER_SIZE + self.len {
                    State::CrcLow
                } else {
                    State::Payload
                };
                self.push(byte, next);
            }
            State::CrcLow => {
                self.crc_low = byte;
                self.state = State::CrcHigh;
            }
            State::CrcHigh => return self.finish(u16::from_le_bytes([self.crc_low, byte])),
        }
        None
    }

    /// Feed a chunk, handing each completed frame to `on_frame` in order.
    pub fn feed_slice(&mut self, bytes: &[u8], mut on_frame: impl FnMut(Frame)) {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte) {
                on_frame(frame);
            }
        }
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.len = 0;
        self.crc_low = 0;
        self.state = State::Stx0;
    }

    /// True when no partial frame is held.
    pub fn is_idle(&self) -> bool {
        self.state == State::Stx0
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn push(&mut self, byte: u8, next: State) {
        self.buf.extend_from_slice(&[byte]);
        self.state = next;
    }

    fn finish(&mut self, received: u16) -> Option<Frame> {
        let computed = crc16(&self.buf);
        if computed != received {
            self.stats.crc_errors += 1;
            trace!(
                received = format_args!("{received:#06x}"),
                computed = format_args!("{computed:#06x}"),
                "crc mismatch, frame dropped"
            );
            self.reset();
            return None;
        }

        let raw = self.buf.split().freeze();
        self.reset();
        self.stats.frames += 1;

        Some(Frame {
            ctrl: raw[2],
            seq: u16::from_le_bytes([raw[5], raw[6]]),
            msg_id: raw[7],
            payload: raw.slice(HEADER_SIZE..),
        })
    }
}
