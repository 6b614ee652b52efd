//! Payload codecs for the handled message ids.
//!
//! Fields are little-endian and packed in declaration order. Decoding
//! zero-extends short payloads, so senders may trim trailing zero bytes.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::Frame;
use crate::msgid;

/// Well-known system and component ids.
pub mod ids {
    /// Flight controller system id.
    pub const FCU_SYSTEM: u8 = 1;
    /// Companion computer system id (this gateway).
    pub const COMPANION_SYSTEM: u8 = 2;
    pub const COMP_ALL: u8 = 0;
    pub const COMP_CAMERA: u8 = 100;
    pub const COMP_ONBOARD_COMPUTER: u8 = 191;
}

/// COMMAND_LONG sub-command ids.
pub mod command {
    pub const DO_DIGICAM_CONTROL: u16 = 203;
    pub const REQUEST_AUTOPILOT_CAPABILITIES: u16 = 520;
    pub const REQUEST_CAMERA_INFORMATION: u16 = 521;
    pub const REQUEST_CAMERA_SETTINGS: u16 = 522;
    pub const REQUEST_STORAGE_INFORMATION: u16 = 525;
    pub const REQUEST_CAMERA_CAPTURE_STATUS: u16 = 527;
    pub const SET_CAMERA_MODE: u16 = 530;
    pub const IMAGE_START_CAPTURE: u16 = 2000;
    pub const IMAGE_STOP_CAPTURE: u16 = 2001;
    pub const VIDEO_START_CAPTURE: u16 = 2500;
    pub const VIDEO_STOP_CAPTURE: u16 = 2501;
}

/// COMMAND_ACK result codes.
pub mod result {
    pub const ACCEPTED: u8 = 0;
    pub const UNSUPPORTED: u8 = 3;
}

/// A message with a fixed id and a packed payload.
pub trait Message: Sized {
    const ID: u8;

    /// Append the packed payload to `dst`.
    fn encode(&self, dst: &mut BytesMut);

    /// Decode from a payload, zero-extending if it is short.
    fn decode(payload: &[u8]) -> Self;

    /// Wrap into an unsequenced frame.
    fn to_frame(&self) -> Frame {
        let mut payload = BytesMut::new();
        self.encode(&mut payload);
        Frame::new(Self::ID, payload.freeze())
    }
}

/// Copy `payload` into an `N`-byte buffer, zero-filling the tail.
fn padded<const N: usize>(payload: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = payload.len().min(N);
    out[..n].copy_from_slice(&payload[..n]);
    out
}

fn put_fixed_str(dst: &mut BytesMut, value: &str, width: usize) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(width);
    dst.put_slice(&bytes[..n]);
    dst.put_bytes(0, width - n);
}

fn get_fixed_str(src: &mut &[u8], width: usize) -> String {
    let raw = &src[..width];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
    let value = String::from_utf8_lossy(&raw[..end]).into_owned();
    src.advance(width);
    value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub custom_mode: u32,
    pub system_status: u8,
}

impl Heartbeat {
    const LEN: usize = 8;
    pub const TYPE_CAMERA: u8 = 30;
    pub const AUTOPILOT_INVALID: u8 = 8;
    pub const STATE_STANDBY: u8 = 3;

    /// Heartbeat advertised by the camera component.
    pub fn camera() -> Self {
        Self {
            mav_type: Self::TYPE_CAMERA,
            autopilot: Self::AUTOPILOT_INVALID,
            base_mode: 0,
            custom_mode: 0,
            system_status: Self::STATE_STANDBY,
        }
    }
}

impl Message for Heartbeat {
    const ID: u8 = msgid::HEARTBEAT;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.custom_mode);
        dst.put_u8(self.mav_type);
        dst.put_u8(self.autopilot);
        dst.put_u8(self.base_mode);
        dst.put_u8(self.system_status);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ Heartbeat::LEN }>(payload);
        let mut src = &raw[..];
        let custom_mode = src.get_u32_le();
        Self {
            custom_mode,
            mav_type: src.get_u8(),
            autopilot: src.get_u8(),
            base_mode: src.get_u8(),
            system_status: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub time_usec: u64,
    pub seq: u32,
    pub target_system: u8,
    pub target_component: u8,
}

impl Ping {
    const LEN: usize = 14;
}

impl Message for Ping {
    const ID: u8 = msgid::PING;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u64_le(self.time_usec);
        dst.put_u32_le(self.seq);
        dst.put_u8(self.target_system);
        dst.put_u8(self.target_component);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ Ping::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_usec: src.get_u64_le(),
            seq: src.get_u32_le(),
            target_system: src.get_u8(),
            target_component: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsRawInt {
    pub time_usec: u64,
    /// Latitude, degE7.
    pub lat: i32,
    /// Longitude, degE7.
    pub lon: i32,
    /// Altitude MSL, mm.
    pub alt: i32,
    pub eph: u16,
    pub epv: u16,
    /// Ground speed, cm/s.
    pub vel: u16,
    /// Course over ground, cdeg.
    pub cog: u16,
    pub fix_type: u8,
    pub satellites_visible: u8,
}

impl GpsRawInt {
    const LEN: usize = 30;
}

impl Message for GpsRawInt {
    const ID: u8 = msgid::GPS_RAW_INT;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u64_le(self.time_usec);
        dst.put_i32_le(self.lat);
        dst.put_i32_le(self.lon);
        dst.put_i32_le(self.alt);
        dst.put_u16_le(self.eph);
        dst.put_u16_le(self.epv);
        dst.put_u16_le(self.vel);
        dst.put_u16_le(self.cog);
        dst.put_u8(self.fix_type);
        dst.put_u8(self.satellites_visible);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ GpsRawInt::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_usec: src.get_u64_le(),
            lat: src.get_i32_le(),
            lon: src.get_i32_le(),
            alt: src.get_i32_le(),
            eph: src.get_u16_le(),
            epv: src.get_u16_le(),
            vel: src.get_u16_le(),
            cog: src.get_u16_le(),
            fix_type: src.get_u8(),
            satellites_visible: src.get_u8(),
        }
    }
}

/// Number of raw channels carried by RC_CHANNELS.
pub const RC_CHANNEL_COUNT: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcChannels {
    pub time_boot_ms: u32,
    /// Raw PWM values; `chan_raw[0]` is channel 1.
    pub chan_raw: [u16; RC_CHANNEL_COUNT],
    pub chancount: u8,
    pub rssi: u8,
}

impl RcChannels {
    const LEN: usize = 4 + 2 * RC_CHANNEL_COUNT + 2;

    /// Raw value of a 1-based channel number. Out-of-range channels read 0.
    pub fn channel(&self, number: u8) -> u16 {
        match number as usize {
            n @ 1..=RC_CHANNEL_COUNT => self.chan_raw[n - 1],
            _ => 0,
        }
    }

    /// Set a 1-based channel. Out-of-range channels are ignored.
    pub fn set_channel(&mut self, number: u8, value: u16) {
        if let n @ 1..=RC_CHANNEL_COUNT = number as usize {
            self.chan_raw[n - 1] = value;
        }
    }
}

impl Default for RcChannels {
    fn default() -> Self {
        Self {
            time_boot_ms: 0,
            chan_raw: [0; RC_CHANNEL_COUNT],
            chancount: RC_CHANNEL_COUNT as u8,
            rssi: 0,
        }
    }
}

impl Message for RcChannels {
    const ID: u8 = msgid::RC_CHANNELS;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.time_boot_ms);
        for value in self.chan_raw {
            dst.put_u16_le(value);
        }
        dst.put_u8(self.chancount);
        dst.put_u8(self.rssi);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ RcChannels::LEN }>(payload);
        let mut src = &raw[..];
        let time_boot_ms = src.get_u32_le();
        let mut chan_raw = [0u16; RC_CHANNEL_COUNT];
        for value in chan_raw.iter_mut() {
            *value = src.get_u16_le();
        }
        Self {
            time_boot_ms,
            chan_raw,
            chancount: src.get_u8(),
            rssi: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandLong {
    pub target_system: u8,
    pub target_component: u8,
    pub command: u16,
    pub confirmation: u8,
    pub params: [f32; 7],
}

impl CommandLong {
    const LEN: usize = 7 * 4 + 2 + 3;

    pub fn new(command: u16) -> Self {
        Self {
            target_system: ids::FCU_SYSTEM,
            target_component: ids::COMP_ALL,
            command,
            confirmation: 0,
            params: [0.0; 7],
        }
    }

    /// Request for AUTOPILOT_VERSION, used to probe the flight controller.
    pub fn request_autopilot_capabilities() -> Self {
        let mut cmd = Self::new(command::REQUEST_AUTOPILOT_CAPABILITIES);
        cmd.params[0] = 1.0;
        cmd
    }
}

impl Message for CommandLong {
    const ID: u8 = msgid::COMMAND_LONG;

    fn encode(&self, dst: &mut BytesMut) {
        for param in self.params {
            dst.put_f32_le(param);
        }
        dst.put_u16_le(self.command);
        dst.put_u8(self.target_system);
        dst.put_u8(self.target_component);
        dst.put_u8(self.confirmation);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ CommandLong::LEN }>(payload);
        let mut src = &raw[..];
        let mut params = [0f32; 7];
        for param in params.iter_mut() {
            *param = src.get_f32_le();
        }
        Self {
            params,
            command: src.get_u16_le(),
            target_system: src.get_u8(),
            target_component: src.get_u8(),
            confirmation: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAck {
    pub command: u16,
    pub result: u8,
    pub progress: u8,
    pub result_param2: i32,
    pub target_system: u8,
    pub target_component: u8,
}

impl CommandAck {
    const LEN: usize = 10;

    /// Acknowledgement addressed to the flight controller.
    pub fn to_fcu(command: u16, result: u8) -> Self {
        Self {
            command,
            result,
            progress: 0,
            result_param2: 0,
            target_system: ids::FCU_SYSTEM,
            target_component: ids::COMP_ALL,
        }
    }
}

impl Message for CommandAck {
    const ID: u8 = msgid::COMMAND_ACK;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.command);
        dst.put_u8(self.result);
        dst.put_u8(self.progress);
        dst.put_i32_le(self.result_param2);
        dst.put_u8(self.target_system);
        dst.put_u8(self.target_component);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ CommandAck::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            command: src.get_u16_le(),
            result: src.get_u8(),
            progress: src.get_u8(),
            result_param2: src.get_i32_le(),
            target_system: src.get_u8(),
            target_component: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutopilotVersion {
    pub capabilities: u64,
    pub flight_sw_version: u32,
    pub middleware_sw_version: u32,
    pub os_sw_version: u32,
    pub board_version: u32,
    /// System id of the sender.
    pub system_id: u8,
}

impl AutopilotVersion {
    const LEN: usize = 8 + 4 * 4 + 1;
}

impl Message for AutopilotVersion {
    const ID: u8 = msgid::AUTOPILOT_VERSION;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u64_le(self.capabilities);
        dst.put_u32_le(self.flight_sw_version);
        dst.put_u32_le(self.middleware_sw_version);
        dst.put_u32_le(self.os_sw_version);
        dst.put_u32_le(self.board_version);
        dst.put_u8(self.system_id);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ AutopilotVersion::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            capabilities: src.get_u64_le(),
            flight_sw_version: src.get_u32_le(),
            middleware_sw_version: src.get_u32_le(),
            os_sw_version: src.get_u32_le(),
            board_version: src.get_u32_le(),
            system_id: src.get_u8(),
        }
    }
}

/// Width of the main tune string field.
pub const TUNE_LEN: usize = 30;
/// Width of the tune continuation field.
pub const TUNE2_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayTune {
    pub target_system: u8,
    pub target_component: u8,
    pub tune: String,
    pub tune2: String,
}

impl PlayTune {
    const LEN: usize = 2 + TUNE_LEN + TUNE2_LEN;

    /// Tune addressed to the flight controller. Text beyond the first field
    /// spills into the continuation field.
    pub fn to_fcu(tune: &str) -> Self {
        let split = floor_char_boundary(tune, TUNE_LEN);
        Self {
            target_system: ids::FCU_SYSTEM,
            target_component: ids::COMP_ALL,
            tune: tune[..split].to_string(),
            tune2: tune[split..].to_string(),
        }
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

impl Message for PlayTune {
    const ID: u8 = msgid::PLAY_TUNE;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.target_system);
        dst.put_u8(self.target_component);
        put_fixed_str(dst, &self.tune, TUNE_LEN);
        put_fixed_str(dst, &self.tune2, TUNE2_LEN);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ PlayTune::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            target_system: src.get_u8(),
            target_component: src.get_u8(),
            tune: get_fixed_str(&mut src, TUNE_LEN),
            tune2: get_fixed_str(&mut src, TUNE2_LEN),
        }
    }
}

/// CAMERA_CAP_FLAGS_CAPTURE_VIDEO | CAMERA_CAP_FLAGS_CAPTURE_IMAGE.
pub const CAMERA_CAP_CAPTURE: u32 = 0x1 | 0x2;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraInformation {
    pub time_boot_ms: u32,
    pub vendor_name: String,
    pub model_name: String,
    pub firmware_version: u32,
    pub focal_length: f32,
    pub resolution_h: u16,
    pub resolution_v: u16,
    pub flags: u32,
    pub gimbal_device_id: u8,
}

impl CameraInformation {
    const NAME_LEN: usize = 32;
    const LEN: usize = 4 + 2 * Self::NAME_LEN + 4 + 4 + 2 + 2 + 4 + 1;
}

impl Message for CameraInformation {
    const ID: u8 = msgid::CAMERA_INFORMATION;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.time_boot_ms);
        put_fixed_str(dst, &self.vendor_name, Self::NAME_LEN);
        put_fixed_str(dst, &self.model_name, Self::NAME_LEN);
        dst.put_u32_le(self.firmware_version);
        dst.put_f32_le(self.focal_length);
        dst.put_u16_le(self.resolution_h);
        dst.put_u16_le(self.resolution_v);
        dst.put_u32_le(self.flags);
        dst.put_u8(self.gimbal_device_id);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ CameraInformation::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_boot_ms: src.get_u32_le(),
            vendor_name: get_fixed_str(&mut src, Self::NAME_LEN),
            model_name: get_fixed_str(&mut src, Self::NAME_LEN),
            firmware_version: src.get_u32_le(),
            focal_length: src.get_f32_le(),
            resolution_h: src.get_u16_le(),
            resolution_v: src.get_u16_le(),
            flags: src.get_u32_le(),
            gimbal_device_id: src.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub time_boot_ms: u32,
    /// 0 image, 1 video.
    pub mode_id: u8,
    pub zoom_level: f32,
    pub focus_level: f32,
}

impl CameraSettings {
    const LEN: usize = 4 + 1 + 4 + 4;
    pub const MODE_IMAGE: u8 = 0;
    pub const MODE_VIDEO: u8 = 1;
}

impl Message for CameraSettings {
    const ID: u8 = msgid::CAMERA_SETTINGS;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.time_boot_ms);
        dst.put_u8(self.mode_id);
        dst.put_f32_le(self.zoom_level);
        dst.put_f32_le(self.focus_level);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ CameraSettings::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_boot_ms: src.get_u32_le(),
            mode_id: src.get_u8(),
            zoom_level: src.get_f32_le(),
            focus_level: src.get_f32_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageInformation {
    pub time_boot_ms: u32,
    pub storage_id: u8,
    pub storage_count: u8,
    /// 0 empty, 1 unformatted, 2 ready, 3 not supported.
    pub status: u8,
    /// MiB.
    pub total_capacity: f32,
    pub used_capacity: f32,
    pub available_capacity: f32,
}

impl StorageInformation {
    const LEN: usize = 4 + 3 + 3 * 4;
    pub const STATUS_READY: u8 = 2;
    pub const STATUS_NOT_SUPPORTED: u8 = 3;
}

impl Message for StorageInformation {
    const ID: u8 = msgid::STORAGE_INFORMATION;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.time_boot_ms);
        dst.put_u8(self.storage_id);
        dst.put_u8(self.storage_count);
        dst.put_u8(self.status);
        dst.put_f32_le(self.total_capacity);
        dst.put_f32_le(self.used_capacity);
        dst.put_f32_le(self.available_capacity);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ StorageInformation::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_boot_ms: src.get_u32_le(),
            storage_id: src.get_u8(),
            storage_count: src.get_u8(),
            status: src.get_u8(),
            total_capacity: src.get_f32_le(),
            used_capacity: src.get_f32_le(),
            available_capacity: src.get_f32_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraCaptureStatus {
    pub time_boot_ms: u32,
    /// 0 idle, 1 capture in progress.
    pub image_status: u8,
    /// 0 idle, 1 capture in progress.
    pub video_status: u8,
    pub image_interval: f32,
    pub recording_time_ms: u32,
    pub available_capacity: f32,
    pub image_count: i32,
}

impl CameraCaptureStatus {
    const LEN: usize = 4 + 2 + 4 + 4 + 4 + 4;
}

impl Message for CameraCaptureStatus {
    const ID: u8 = msgid::CAMERA_CAPTURE_STATUS;

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.time_boot_ms);
        dst.put_u8(self.image_status);
        dst.put_u8(self.video_status);
        dst.put_f32_le(self.image_interval);
        dst.put_u32_le(self.recording_time_ms);
        dst.put_f32_le(self.available_capacity);
        dst.put_i32_le(self.image_count);
    }

    fn decode(payload: &[u8]) -> Self {
        let raw = padded::<{ CameraCaptureStatus::LEN }>(payload);
        let mut src = &raw[..];
        Self {
            time_boot_ms: src.get_u32_le(),
            image_status: src.get_u8(),
            video_status: src.get_u8(),
            image_interval: src.get_f32_le(),
            recording_time_ms: src.get_u32_le(),
            available_capacity: src.get_f32_le(),
            image_count: src.get_i32_le(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_channels_layout_and_channel_lookup() {
        let mut rc = RcChannels::default();
        rc.set_channel(1, 1500);
        rc.set_channel(14, 2000);
        rc.set_channel(19, 1234);

        let frame = rc.to_frame();
        assert_eq!(frame.msg_id, msgid::RC_CHANNELS);
        assert_eq!(frame.payload.len(), RcChannels::LEN);
        // time_boot_ms first, then chan1.
        assert_eq!(&frame.payload[4..6], &1500u16.to_le_bytes());

        let decoded = RcChannels::decode(&frame.payload);
        assert_eq!(decoded.channel(1), 1500);
        assert_eq!(decoded.channel(14), 2000);
        assert_eq!(decoded.channel(0), 0);
        assert_eq!(decoded.channel(19), 0);
    }

    #[test]
    fn short_payload_is_zero_extended() {
        let mut payload = BytesMut::new();
        payload.put_u32_le(99);
        payload.put_u16_le(1700);

        let rc = RcChannels::decode(&payload);
        assert_eq!(rc.time_boot_ms, 99);
        assert_eq!(rc.channel(1), 1700);
        assert_eq!(rc.channel(2), 0);
        assert_eq!(rc.chancount, 0);
    }

    #[test]
    fn command_long_carries_subcommand() {
        let cmd = CommandLong::request_autopilot_capabilities();
        let frame = cmd.to_frame();
        assert_eq!(frame.msg_id, msgid::COMMAND_LONG);

        let decoded = CommandLong::decode(&frame.payload);
        assert_eq!(decoded.command, command::REQUEST_AUTOPILOT_CAPABILITIES);
        assert_eq!(decoded.params[0], 1.0);
        assert_eq!(decoded.target_system, ids::FCU_SYSTEM);
    }

    #[test]
    fn ack_addressed_to_fcu() {
        let ack = CommandAck::to_fcu(command::SET_CAMERA_MODE, result::ACCEPTED);
        let decoded = CommandAck::decode(&ack.to_frame().payload);
        assert_eq!(decoded, ack);
        assert_eq!(decoded.target_system, ids::FCU_SYSTEM);
    }

    #[test]
    fn play_tune_splits_long_tunes() {
        let tune = "MBNT255a8a8a8a8a8a8a8a8a8a8a8a8a8a8a8a8";
        let msg = PlayTune::to_fcu(tune);
        assert_eq!(msg.tune.len(), TUNE_LEN);
        assert_eq!(format!("{}{}", msg.tune, msg.tune2), tune);

        let frame = msg.to_frame();
        assert_eq!(frame.msg_id, msgid::PLAY_TUNE);
        assert_eq!(frame.payload.len(), PlayTune::LEN);
        assert_eq!(PlayTune::decode(&frame.payload), msg);
    }

    #[test]
    fn play_tune_short_tune_has_empty_continuation() {
        let msg = PlayTune::to_fcu("MFT100a8");
        assert_eq!(msg.tune, "MFT100a8");
        assert!(msg.tune2.is_empty());
    }

    #[test]
    fn camera_heartbeat_fields() {
        let hb = Heartbeat::camera();
        let decoded = Heartbeat::decode(&hb.to_frame().payload);
        assert_eq!(decoded.mav_type, Heartbeat::TYPE_CAMERA);
        assert_eq!(decoded.system_status, Heartbeat::STATE_STANDBY);
    }

    #[test]
    fn camera_information_names_are_truncated_and_nul_padded() {
        let info = CameraInformation {
            time_boot_ms: 0,
            vendor_name: "SIYI".to_string(),
            model_name: "x".repeat(40),
            firmware_version: 0,
            focal_length: 0.0,
            resolution_h: 1920,
            resolution_v: 1080,
            flags: CAMERA_CAP_CAPTURE,
            gimbal_device_id: 1,
        };
        let decoded = CameraInformation::decode(&info.to_frame().payload);
        assert_eq!(decoded.vendor_name, "SIYI");
        assert_eq!(decoded.model_name.len(), 32);
        assert_eq!(decoded.resolution_h, 1920);
        assert_eq!(decoded.flags, CAMERA_CAP_CAPTURE);
    }

    #[test]
    fn gps_fields_in_order() {
        let gps = GpsRawInt {
            time_usec: 1,
            lat: -350_000_000,
            lon: 1_390_000_000,
            alt: 12_000,
            eph: 100,
            epv: 200,
            vel: 300,
            cog: 4500,
            fix_type: 3,
            satellites_visible: 11,
        };
        assert_eq!(GpsRawInt::decode(&gps.to_frame().payload), gps);
    }
}
