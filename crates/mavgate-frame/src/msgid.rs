//! Message ids.
//!
//! Ids below 248 follow the common MAVLink numbering. Camera and tune
//! messages whose upstream ids do not fit in one byte live in 248..=252.

pub const HEARTBEAT: u8 = 0;
pub const PING: u8 = 4;
pub const GPS_RAW_INT: u8 = 24;
pub const RC_CHANNELS: u8 = 65;
pub const COMMAND_LONG: u8 = 76;
pub const COMMAND_ACK: u8 = 77;
pub const AUTOPILOT_VERSION: u8 = 148;
pub const PLAY_TUNE: u8 = 248;
pub const CAMERA_INFORMATION: u8 = 249;
pub const CAMERA_SETTINGS: u8 = 250;
pub const STORAGE_INFORMATION: u8 = 251;
pub const CAMERA_CAPTURE_STATUS: u8 = 252;

/// Returns a human-readable name for a message id.
pub fn message_name(id: u8) -> &'static str {
    match id {
        HEARTBEAT => "HEARTBEAT",
        PING => "PING",
        GPS_RAW_INT => "GPS_RAW_INT",
        RC_CHANNELS => "RC_CHANNELS",
        COMMAND_LONG => "COMMAND_LONG",
        COMMAND_ACK => "COMMAND_ACK",
        AUTOPILOT_VERSION => "AUTOPILOT_VERSION",
        PLAY_TUNE => "PLAY_TUNE",
        CAMERA_INFORMATION => "CAMERA_INFORMATION",
        CAMERA_SETTINGS => "CAMERA_SETTINGS",
        STORAGE_INFORMATION => "STORAGE_INFORMATION",
        CAMERA_CAPTURE_STATUS => "CAMERA_CAPTURE_STATUS",
        _ => "UNKNOWN",
    }
}

/// Returns true if the id has a payload codec in this crate.
pub fn is_known(id: u8) -> bool {
    message_name(id) != "UNKNOWN"
}
