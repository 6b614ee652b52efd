//! Out-of-band command records delivered through the command FIFO.
//!
//! A record is five native-endian `i32`s: a type followed by four
//! arguments. Reads may deliver a record in pieces; the accumulator holds
//! the partial record between loop iterations.

use mavgate_frame::message::{Message, PlayTune};
use mavgate_frame::Frame;
use tracing::{info, warn};

use crate::tunes;

/// Size of one record on the wire.
pub const COMMAND_RECORD_SIZE: usize = 20;

/// Record type: play the tune whose index is in `args[0]`.
pub const PLAY_TUNE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    pub kind: i32,
    pub args: [i32; 4],
}

impl CommandRecord {
    pub fn play_tune(index: i32) -> Self {
        Self {
            kind: PLAY_TUNE,
            args: [index, 0, 0, 0],
        }
    }

    pub fn to_bytes(&self) -> [u8; COMMAND_RECORD_SIZE] {
        let mut out = [0u8; COMMAND_RECORD_SIZE];
        let fields = [self.kind, self.args[0], self.args[1], self.args[2], self.args[3]];
        for (chunk, value) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_ne_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; COMMAND_RECORD_SIZE]) -> Self {
        let mut fields = [0i32; 5];
        for (value, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            kind: fields[0],
            args: [fields[1], fields[2], fields[3], fields[4]],
        }
    }

    /// The frame this record asks the gateway to send, if any.
    pub fn to_frame(&self) -> Option<Frame> {
        match self.kind {
            PLAY_TUNE => {
                let index = self.args[0];
                match tunes::tune(index) {
                    Some(tune) => {
                        info!(
                            index,
                            name = tunes::tune_name(index).unwrap_or_default(),
                            "playing tune"
                        );
                        Some(PlayTune::to_fcu(tune).to_frame())
                    }
                    None => {
                        warn!(index, "tune index out of range, ignored");
                        None
                    }
                }
            }
            other => {
                warn!(kind = other, "unknown command record type, ignored");
                None
            }
        }
    }
}

/// Reassembles records from partial reads.
#[derive(Debug, Default)]
pub struct CommandAccumulator {
    buf: [u8; COMMAND_RECORD_SIZE],
    len: usize,
}

impl CommandAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes buffered so far. Always below [`COMMAND_RECORD_SIZE`].
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The unfilled tail. Reading into it never over-reads a record.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// Account for `n` bytes written into [`spare_mut`](Self::spare_mut).
    /// Returns the record when it is complete and resets.
    pub fn advance(&mut self, n: usize) -> Option<CommandRecord> {
        self.len = (self.len + n).min(COMMAND_RECORD_SIZE);
        if self.len < COMMAND_RECORD_SIZE {
            return None;
        }
        self.len = 0;
        Some(CommandRecord::from_bytes(&self.buf))
    }

    /// Copy as much of `bytes` as fits. Returns bytes consumed and the
    /// record if this completed one.
    pub fn push(&mut self, bytes: &[u8]) -> (usize, Option<CommandRecord>) {
        let spare = self.spare_mut();
        let n = spare.len().min(bytes.len());
        spare[..n].copy_from_slice(&bytes[..n]);
        (n, self.advance(n))
    }
}
