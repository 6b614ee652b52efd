//! RC stick and button mapping onto the gimbal.
//!
//! Sticks move the gimbal incrementally: every RC_CHANNELS frame with a stick
//! past half deflection nudges the target attitude by a fixed step. The zoom
//! wheel commits one step each time it returns from an end stop, and the
//! buttons act on edges of their raw PWM value.

use mavgate_frame::message::{Message, RcChannels};
use mavgate_frame::Frame;
use tracing::{debug, info};

use crate::config::{AxisConfig, RcConfig};
use crate::dispatch::{Handler, HandlerContext};

/// Degrees added per frame while a stick is deflected.
const STEP_DEG: f32 = 0.3;
/// Normalized deflection a stick must exceed to move the gimbal.
const DEADBAND: f32 = 50.0;

const YAW_LIMIT_DEG: (f32, f32) = (-135.0, 135.0);
const PITCH_LIMIT_DEG: (f32, f32) = (-90.0, 25.0);

/// Zoom is tracked in tenths: 10 = 1.0x.
const ZOOM_STEP: i32 = 5;
const ZOOM_RANGE: (i32, i32) = (10, 40);

/// Map a raw PWM value to roughly [-100, 100]. Values outside the
/// calibrated range map outside it; nothing is clamped here.
pub fn normalize(raw: u16, axis: &AxisConfig) -> f32 {
    let span = f32::from(axis.max) - f32::from(axis.min);
    let value = (f32::from(raw) - f32::from(axis.mid)) / span * 200.0;
    if axis.reverse {
        -value
    } else {
        value
    }
}

/// Remembers the previous raw value of a button channel.
#[derive(Debug, Default)]
struct EdgeLatch {
    last: Option<u16>,
}

impl EdgeLatch {
    /// True when `raw` differs from the previous value. The first value only
    /// latches.
    fn changed(&mut self, raw: u16) -> bool {
        match self.last.replace(raw) {
            Some(last) => last != raw,
            None => false,
        }
    }
}

pub struct RcHandler {
    config: RcConfig,
    yaw: f32,
    pitch: f32,
    zoom_tenths: i32,
    zoom_dir: i32,
    zoom_armed: bool,
    center: EdgeLatch,
    snapshot: EdgeLatch,
    record: EdgeLatch,
}

impl RcHandler {
    pub fn new(config: RcConfig) -> Self {
        Self {
            config,
            yaw: 0.0,
            pitch: 0.0,
            zoom_tenths: ZOOM_RANGE.0,
            zoom_dir: 0,
            zoom_armed: false,
            center: EdgeLatch::default(),
            snapshot: EdgeLatch::default(),
            record: EdgeLatch::default(),
        }
    }

    /// Accumulated target yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Accumulated target pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current zoom ratio.
    pub fn zoom(&self) -> f32 {
        self.zoom_tenths as f32 / 10.0
    }

    fn apply(&mut self, rc: &RcChannels, ctx: &mut HandlerContext<'_>) {
        let cfg = self.config;

        let yaw_in = normalize(rc.channel(cfg.yaw.channel), &cfg.yaw);
        let pitch_in = normalize(rc.channel(cfg.pitch.channel), &cfg.pitch);

        self.yaw = nudge(self.yaw, yaw_in).clamp(YAW_LIMIT_DEG.0, YAW_LIMIT_DEG.1);
        self.pitch = nudge(self.pitch, pitch_in).clamp(PITCH_LIMIT_DEG.0, PITCH_LIMIT_DEG.1);

        if self.center.changed(rc.channel(cfg.center_button)) {
            debug!("center button");
            self.yaw = 0.0;
            self.pitch = 0.0;
            ctx.device.center();
        }

        self.step_zoom(rc.channel(cfg.zoom.channel), ctx);

        if self.snapshot.changed(rc.channel(cfg.snapshot_button)) {
            ctx.device.save_snapshot();
        }

        if self.record.changed(rc.channel(cfg.record_button)) {
            ctx.device.toggle_recording();
        }

        ctx.device.rotate((self.yaw * 10.0) as i16, (self.pitch * 10.0) as i16);
    }

    fn step_zoom(&mut self, raw: u16, ctx: &mut HandlerContext<'_>) {
        let axis = &self.config.zoom;
        if raw <= axis.min {
            self.zoom_armed = true;
            self.zoom_dir = 1;
        } else if raw >= axis.max {
            self.zoom_armed = true;
            self.zoom_dir = -1;
        } else if self.zoom_armed {
            self.zoom_armed = false;
            let next = self.zoom_tenths + self.zoom_dir * ZOOM_STEP;
            self.zoom_tenths = next.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
            info!(ratio = self.zoom(), "zoom step");
            let (integer, decimal) = (self.zoom_tenths / 10, self.zoom_tenths % 10);
            ctx.device.set_zoom(integer as u8, decimal as u8);
        }
    }
}

fn nudge(current: f32, input: f32) -> f32 {
    if input.abs() > DEADBAND {
        current + STEP_DEG.copysign(input)
    } else {
        current
    }
}

impl Handler for RcHandler {
    fn handle(&mut self, frame: &Frame, ctx: &mut HandlerContext<'_>) {
        let rc = RcChannels::decode(&frame.payload);
        self.apply(&rc, ctx);
    }
}
