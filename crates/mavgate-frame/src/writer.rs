use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::message::Message;

/// Writes complete frames to any `Write` stream.
///
/// Outgoing frames are stamped with a wrapping sequence counter. Raw
/// pass-through bytes go through the same drain loop but are not framed.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    seq: u16,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(HEADER_SIZE + config.max_payload_size + 2),
            seq: 0,
            config,
        }
    }

    /// Write a frame exactly as given, keeping its ctrl and sequence.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: frame.payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(frame, &mut self.buf)?;
        drain(&mut self.inner, &self.buf)?;
        self.flush()
    }

    /// Stamp the next sequence number on `frame` and write it.
    pub fn send_frame(&mut self, frame: Frame) -> Result<()> {
        let frame = frame.with_seq(self.seq);
        self.write_frame(&frame)?;
        self.seq = self.seq.wrapping_add(1);
        Ok(())
    }

    /// Encode and send a payload under a message id.
    pub fn send(&mut self, msg_id: u8, payload: &[u8]) -> Result<()> {
        self.send_frame(Frame::new(msg_id, payload.to_vec()))
    }

    /// Encode and send a typed message.
    pub fn send_message<M: Message>(&mut self, message: &M) -> Result<()> {
        self.send_frame(message.to_frame())
    }

    /// Write pre-encoded bytes unchanged (blocking until fully drained).
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        drain(&mut self.inner, bytes)?;
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Sequence number the next stamped frame will carry.
    pub fn next_seq(&self) -> u16 {
        self.seq
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn drain<T: Write>(inner: &mut T, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::decoder::Decoder;
    use crate::message::{CommandAck, Heartbeat};
    use crate::msgid;

    fn decode(bytes: &[u8]) -> Vec<Frame> {
        let mut decoder = Decoder::new();
        let mut frames = Vec::new();
        decoder.feed_slice(bytes, |f| frames.push(f));
        frames
    }

    #[test]
    fn sequence_numbers_increment_per_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(1, b"one").unwrap();
        writer.send(2, b"two").unwrap();
        writer.send_message(&Heartbeat::camera()).unwrap();
        assert_eq!(writer.next_seq(), 3);

        let frames = decode(&writer.into_inner().into_inner());
        let seqs: Vec<u16> = frames.iter().map(|f| f.seq).collect();
        let ids: Vec<u8> = frames.iter().map(|f| f.msg_id).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(ids, vec![1, 2, msgid::HEARTBEAT]);
    }

    #[test]
    fn sequence_wraps() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.seq = u16::MAX;
        writer.send(1, b"x").unwrap();
        assert_eq!(writer.next_seq(), 0);
    }

    #[test]
    fn write_frame_keeps_given_sequence() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let frame = Frame::new(9, &b"abc"[..]).with_seq(42);
        writer.write_frame(&frame).unwrap();
        assert_eq!(writer.next_seq(), 0);

        let frames = decode(&writer.into_inner().into_inner());
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn typed_message_roundtrips_through_decoder() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let ack = CommandAck::to_fcu(2000, 0);
        writer.send_message(&ack).unwrap();

        let frames = decode(&writer.into_inner().into_inner());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_id, msgid::COMMAND_ACK);
        assert_eq!(CommandAck::decode(&frames[0].payload), ack);
    }

    #[test]
    fn payload_too_large_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 4,
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = writer.send(1, b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert_eq!(
            writer.next_seq(),
            0,
            "rejected frames do not consume a sequence"
        );
    }

    #[test]
    fn raw_bytes_pass_through_unchanged() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_raw(b"\x01\x02not-a-frame").unwrap();
        assert_eq!(writer.next_seq(), 0);
        assert_eq!(writer.into_inner().into_inner(), b"\x01\x02not-a-frame");
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(1, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_and_would_block() {
        let mut writer = FrameWriter::new(FlakyWriter::default());
        writer.send(5, b"retry").unwrap();
        writer.write_raw(b"raw").unwrap();

        let inner = writer.into_inner();
        assert_eq!(decode(&inner.data).len(), 1);
        assert!(inner.data.ends_with(b"raw"));
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        let err = writer.write_raw(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails every other call, alternating Interrupted and WouldBlock, and
    /// accepts at most three bytes per successful write.
    #[derive(Default)]
    struct FlakyWriter {
        calls: usize,
        data: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.calls += 1;
            match self.calls % 4 {
                1 => Err(std::io::Error::from(ErrorKind::Interrupted)),
                3 => Err(std::io::Error::from(ErrorKind::WouldBlock)),
                _ => {
                    let n = buf.len().min(3);
                    self.data.extend_from_slice(&buf[..n]);
                    Ok(n)
                }
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
