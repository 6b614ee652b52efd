use mavgate_frame::message::{
    command, result, CameraCaptureStatus, CameraInformation, CameraSettings, CommandAck,
    CommandLong, Message, StorageInformation, CAMERA_CAP_CAPTURE,
};
use mavgate_frame::Frame;
use tracing::{debug, info};

use crate::actuation::Device;
use crate::config::DeviceConfig;
use crate::dispatch::{Handler, HandlerContext};

/// Answers camera-protocol COMMAND_LONG requests.
///
/// Every sub-command is acknowledged; recognized ones with ACCEPTED,
/// anything else with UNSUPPORTED.
pub struct CommandHandler {
    vendor_name: String,
    model_name: String,
}

impl CommandHandler {
    pub fn new(device: &DeviceConfig) -> Self {
        Self {
            vendor_name: device.vendor_name.clone(),
            model_name: device.model_name.clone(),
        }
    }

    fn camera_information(&self) -> Frame {
        CameraInformation {
            time_boot_ms: 0,
            vendor_name: self.vendor_name.clone(),
            model_name: self.model_name.clone(),
            firmware_version: 0,
            focal_length: 0.0,
            resolution_h: 0,
            resolution_v: 0,
            flags: CAMERA_CAP_CAPTURE,
            gimbal_device_id: 1,
        }
        .to_frame()
    }
}

fn camera_settings(device: &Device) -> Frame {
    let state = device.state();
    CameraSettings {
        time_boot_ms: 0,
        mode_id: if state.recording {
            CameraSettings::MODE_VIDEO
        } else {
            CameraSettings::MODE_IMAGE
        },
        zoom_level: f32::from(state.zoom.0) + f32::from(state.zoom.1) / 10.0,
        focus_level: f32::NAN,
    }
    .to_frame()
}

fn storage_information() -> Frame {
    StorageInformation {
        time_boot_ms: 0,
        storage_id: 1,
        storage_count: 1,
        status: StorageInformation::STATUS_NOT_SUPPORTED,
        total_capacity: 0.0,
        used_capacity: 0.0,
        available_capacity: 0.0,
    }
    .to_frame()
}

fn capture_status(device: &Device) -> Frame {
    let state = device.state();
    CameraCaptureStatus {
        time_boot_ms: 0,
        image_status: 0,
        video_status: u8::from(state.recording),
        image_interval: 0.0,
        recording_time_ms: 0,
        available_capacity: 0.0,
        image_count: state.snapshots as i32,
    }
    .to_frame()
}

impl Handler for CommandHandler {
    fn handle(&mut self, frame: &Frame, ctx: &mut HandlerContext<'_>) {
        let cmd = CommandLong::decode(&frame.payload);
        debug!(command = cmd.command, "command_long");

        let mut extra = Vec::new();
        let accepted = match cmd.command {
            command::DO_DIGICAM_CONTROL => true,
            command::REQUEST_CAMERA_INFORMATION => {
                extra.push(self.camera_information());
                true
            }
            command::REQUEST_CAMERA_SETTINGS => {
                extra.push(camera_settings(ctx.device));
                true
            }
            command::REQUEST_STORAGE_INFORMATION => {
                extra.push(storage_information());
                true
            }
            command::REQUEST_CAMERA_CAPTURE_STATUS | command::SET_CAMERA_MODE => {
                extra.push(capture_status(ctx.device));
                true
            }
            command::IMAGE_START_CAPTURE => {
                ctx.device.save_snapshot();
                true
            }
            command::IMAGE_STOP_CAPTURE => true,
            command::VIDEO_START_CAPTURE => {
                ctx.device.set_recording(true);
                true
            }
            command::VIDEO_STOP_CAPTURE => {
                ctx.device.set_recording(false);
                true
            }
            other => {
                info!(command = other, "unsupported command_long");
                false
            }
        };

        let code = if accepted {
            result::ACCEPTED
        } else {
            result::UNSUPPORTED
        };
        ctx.replies.push(CommandAck::to_fcu(cmd.command, code).to_frame());
        ctx.replies.extend(extra);
    }
}
