//! CRC16-checked framing for the mavgate link protocol.
//!
//! Every message is framed with:
//! - A 2-byte start marker (0x55 0x66)
//! - A control byte, a 2-byte little-endian payload length, and a 2-byte
//!   little-endian sequence number
//! - A 1-byte message id
//! - A CRC16 (CCITT, XMODEM parameters) over everything before it
//!
//! The [`Decoder`] is fed one byte at a time and yields only frames whose
//! checksum matched.

pub mod codec;
pub mod crc;
pub mod decoder;
pub mod error;
pub mod message;
pub mod msgid;
pub mod reader;
pub mod writer;

pub use codec::{encode_frame, Frame, FrameConfig, CRC_SIZE, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, STX};
pub use decoder::{Decoder, DecoderStats};
pub use error::{FrameError, Result};
pub use message::Message;
pub use reader::FrameReader;
pub use writer::FrameWriter;
