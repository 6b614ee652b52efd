use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use mavgate_frame::message::{AutopilotVersion, Message};
use mavgate_frame::Frame;
use tracing::info;

use crate::dispatch::{Handler, HandlerContext};

/// One-way latch set when the flight controller first answers.
///
/// Shared between the loop and the heartbeat thread.
#[derive(Debug, Clone, Default)]
pub struct RemoteReady {
    inner: Arc<Latch>,
}

#[derive(Debug, Default)]
struct Latch {
    ready: AtomicBool,
    system_id: AtomicU8,
}

impl RemoteReady {
    /// Set the latch. Returns true only for the call that set it.
    ///
    /// Only the event loop sets the latch; other threads just read it.
    pub fn set(&self, system_id: u8) -> bool {
        if self.is_ready() {
            return false;
        }
        self.inner.system_id.store(system_id, Ordering::Release);
        !self.inner.ready.swap(true, Ordering::AcqRel)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// System id recorded by the first AUTOPILOT_VERSION.
    pub fn system_id(&self) -> Option<u8> {
        self.is_ready().then(|| self.inner.system_id.load(Ordering::Acquire))
    }
}

pub struct ReadinessHandler;

impl Handler for ReadinessHandler {
    fn handle(&mut self, frame: &Frame, ctx: &mut HandlerContext<'_>) {
        let version = AutopilotVersion::decode(&frame.payload);
        if ctx.remote_ready.set(version.system_id) {
            info!(
                sys_id = version.system_id,
                "established connection with flight controller"
            );
        }
    }
}
