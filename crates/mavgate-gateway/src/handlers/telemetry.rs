use mavgate_frame::message::{GpsRawInt, Message, Ping};
use mavgate_frame::Frame;
use tracing::{info, trace};

use crate::dispatch::{Handler, HandlerContext};

pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&mut self, frame: &Frame, _ctx: &mut HandlerContext<'_>) {
        let ping = Ping::decode(&frame.payload);
        info!(seq = ping.seq, "received ping");
    }
}

pub struct GpsHandler;

impl Handler for GpsHandler {
    fn handle(&mut self, frame: &Frame, _ctx: &mut HandlerContext<'_>) {
        let gps = GpsRawInt::decode(&frame.payload);
        trace!(
            lat = gps.lat,
            lon = gps.lon,
            alt = gps.alt,
            fix = gps.fix_type,
            sats = gps.satellites_visible,
            "gps"
        );
    }
}
