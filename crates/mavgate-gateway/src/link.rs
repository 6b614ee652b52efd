//! The write half of the serial link, shared by the loop and the heartbeat
//! thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mavgate_frame::FrameWriter;
use mavgate_transport::SerialStream;

/// Writes are serialized at frame granularity by the mutex.
pub type SharedWriter = Arc<Mutex<FrameWriter<SerialStream>>>;

pub fn shared_writer(stream: SerialStream) -> SharedWriter {
    Arc::new(Mutex::new(FrameWriter::new(stream)))
}

/// Lock the writer. A panic in another writer leaves the stream usable, so
/// poisoning is ignored.
pub fn lock_writer(writer: &SharedWriter) -> MutexGuard<'_, FrameWriter<SerialStream>> {
    writer.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use mavgate_frame::message::Ping;
    use mavgate_frame::{Decoder, Message};

    use super::*;

    #[test]
    fn survives_a_poisoned_lock() {
        let (stream, mut device) = SerialStream::loopback_pair().unwrap();
        let writer = shared_writer(stream);

        let poisoner = Arc::clone(&writer);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("writer thread died");
        })
        .join();
        assert!(writer.is_poisoned());

        let ping = Ping {
            time_usec: 7,
            seq: 1,
            target_system: 0,
            target_component: 0,
        };
        lock_writer(&writer).send_message(&ping).unwrap();

        let mut buf = [0u8; 64];
        let n = device.read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let mut frames = Vec::new();
        decoder.feed_slice(&buf[..n], |f| frames.push(f));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_id, Ping::ID);
    }
}
