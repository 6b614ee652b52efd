//! Periodic camera heartbeat.
//!
//! A dedicated thread wakes on a short tick and, once the flight controller
//! has answered, sends one heartbeat per period through the shared writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use mavgate_frame::message::Heartbeat;
use tracing::{debug, warn};

use crate::error::Result;
use crate::handlers::RemoteReady;
use crate::link::{lock_writer, SharedWriter};

/// Wake-up granularity of the heartbeat thread.
pub const TICK: Duration = Duration::from_millis(10);

pub struct HeartbeatTask {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatTask {
    pub fn spawn(writer: SharedWriter, ready: RemoteReady, period: Duration) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("mavgate-heartbeat".to_string())
            .spawn(move || run(&writer, &ready, period, &flag))?;
        debug!(?period, "heartbeat thread started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("heartbeat thread panicked");
            }
        }
    }
}

impl Drop for HeartbeatTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(writer: &SharedWriter, ready: &RemoteReady, period: Duration, stop: &AtomicBool) {
    let heartbeat = Heartbeat::camera();
    let mut last_sent: Option<Instant> = None;

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(TICK);
        if !ready.is_ready() {
            continue;
        }
        if last_sent.is_some_and(|at| at.elapsed() < period) {
            continue;
        }
        last_sent = Some(Instant::now());
        if let Err(err) = lock_writer(writer).send_message(&heartbeat) {
            warn!(%err, "failed to send heartbeat");
        }
    }
    debug!("heartbeat thread exiting");
}
