//! Message-id to handler dispatch.

use mavgate_frame::msgid::message_name;
use mavgate_frame::Frame;
use tracing::debug;

use crate::actuation::Device;
use crate::config::{DeviceConfig, RcConfig};
use crate::handlers::{
    CommandHandler, GpsHandler, PingHandler, RcHandler, ReadinessHandler, RemoteReady,
};

/// What a handler may touch while processing one frame.
pub struct HandlerContext<'a> {
    pub device: &'a mut Device,
    /// Frames to write back to the flight controller once the chunk is fed.
    pub replies: &'a mut Vec<Frame>,
    pub remote_ready: &'a RemoteReady,
}

pub trait Handler: Send {
    fn handle(&mut self, frame: &Frame, ctx: &mut HandlerContext<'_>);
}

/// Static table of handlers, looked up linearly by message id.
pub struct DispatchTable {
    entries: Vec<(u8, Box<dyn Handler>)>,
    unknown_count: u64,
}

impl DispatchTable {
    /// An empty table. Every frame counts as unknown.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            unknown_count: 0,
        }
    }

    /// The gateway's handler set.
    pub fn standard(rc: RcConfig, device: &DeviceConfig) -> Self {
        use mavgate_frame::msgid::*;

        Self::empty()
            .with(PING, PingHandler)
            .with(GPS_RAW_INT, GpsHandler)
            .with(RC_CHANNELS, RcHandler::new(rc))
            .with(COMMAND_LONG, CommandHandler::new(device))
            .with(AUTOPILOT_VERSION, ReadinessHandler)
    }

    /// Add a handler. The first entry registered for an id wins.
    pub fn with(mut self, msg_id: u8, handler: impl Handler + 'static) -> Self {
        self.entries.push((msg_id, Box::new(handler)));
        self
    }

    /// Route one frame. Returns false if no handler matched.
    pub fn dispatch(&mut self, frame: &Frame, ctx: &mut HandlerContext<'_>) -> bool {
        match self.entries.iter_mut().find(|(id, _)| *id == frame.msg_id) {
            Some((_, handler)) => {
                handler.handle(frame, ctx);
                true
            }
            None => {
                self.unknown_count += 1;
                debug!(
                    msg_id = frame.msg_id,
                    name = message_name(frame.msg_id),
                    "no handler for message"
                );
                false
            }
        }
    }

    /// Frames that decoded cleanly but had no handler.
    pub fn unknown_count(&self) -> u64 {
        self.unknown_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
