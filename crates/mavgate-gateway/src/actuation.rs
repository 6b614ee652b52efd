//! Gimbal and camera actuation.
//!
//! Vendor backends implement [`Gimbal`] and [`Camera`]. The gateway only
//! talks to a [`Device`], which remembers the last commanded state and keeps
//! backend failures from reaching the event loop.

use tracing::{debug, info, warn};

use crate::config::{DeviceConfig, DeviceKind};
use crate::error::Result;
use crate::siyi::SiyiGimbal;

pub trait Gimbal: Send {
    /// Absolute attitude in tenths of a degree.
    fn rotate(&mut self, yaw: i16, pitch: i16) -> Result<()>;
    /// Zoom ratio as integer and tenths, e.g. `(2, 5)` for 2.5x.
    fn set_zoom(&mut self, integer: u8, decimal: u8) -> Result<()>;
    fn center(&mut self) -> Result<()>;
}

pub trait Camera: Send {
    fn save_snapshot(&mut self) -> Result<()>;
    fn toggle_recording(&mut self) -> Result<()>;
    /// Flush any recording state before the process exits.
    fn finish_recording(&mut self) -> Result<()>;
}

/// A backend providing both halves.
pub trait Backend: Gimbal + Camera {
    fn name(&self) -> &'static str;
}

/// Backend that accepts every command and does nothing.
#[derive(Debug, Default)]
pub struct NullDevice;

impl Gimbal for NullDevice {
    fn rotate(&mut self, _yaw: i16, _pitch: i16) -> Result<()> {
        Ok(())
    }

    fn set_zoom(&mut self, _integer: u8, _decimal: u8) -> Result<()> {
        Ok(())
    }

    fn center(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Camera for NullDevice {
    fn save_snapshot(&mut self) -> Result<()> {
        Ok(())
    }

    fn toggle_recording(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish_recording(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Backend for NullDevice {
    fn name(&self) -> &'static str {
        "none"
    }
}

/// Last commanded device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    /// Tenths of a degree.
    pub yaw: i16,
    /// Tenths of a degree.
    pub pitch: i16,
    pub zoom: (u8, u8),
    pub recording: bool,
    pub snapshots: u32,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            yaw: 0,
            pitch: 0,
            zoom: (1, 0),
            recording: false,
            snapshots: 0,
        }
    }
}

/// The actuation facade used by the gateway.
pub struct Device {
    backend: Box<dyn Backend>,
    state: DeviceState,
}

impl Device {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            state: DeviceState::default(),
        }
    }

    /// A device with no backend.
    pub fn null() -> Self {
        Self::new(Box::new(NullDevice))
    }

    /// Build the backend selected by configuration.
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        let backend: Box<dyn Backend> = match config.kind {
            DeviceKind::Siyi => Box::new(SiyiGimbal::connect((config.ip.as_str(), config.port))?),
            DeviceKind::Null => Box::new(NullDevice),
        };
        info!(kind = config.kind.as_str(), "actuation backend ready");
        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.recording
    }

    pub fn rotate(&mut self, yaw: i16, pitch: i16) {
        self.state.yaw = yaw;
        self.state.pitch = pitch;
        report("rotate", self.backend.rotate(yaw, pitch));
    }

    pub fn set_zoom(&mut self, integer: u8, decimal: u8) {
        self.state.zoom = (integer, decimal);
        info!(zoom = format_args!("{integer}.{decimal}"), "zoom ratio");
        report("set_zoom", self.backend.set_zoom(integer, decimal));
    }

    /// Return the gimbal to its neutral attitude.
    pub fn center(&mut self) {
        self.state.yaw = 0;
        self.state.pitch = 0;
        report("center", self.backend.center());
    }

    /// Center the gimbal and return to 1x zoom, the state the RC control law
    /// starts from.
    pub fn reset(&mut self) {
        self.center();
        self.set_zoom(1, 0);
    }

    pub fn save_snapshot(&mut self) {
        self.state.snapshots += 1;
        info!("saving snapshot");
        report("save_snapshot", self.backend.save_snapshot());
    }

    pub fn toggle_recording(&mut self) {
        self.state.recording = !self.state.recording;
        if self.state.recording {
            info!("start recording video");
        } else {
            info!("stop recording video");
        }
        report("toggle_recording", self.backend.toggle_recording());
    }

    /// Drive recording to `on`. Returns false when already in that state.
    pub fn set_recording(&mut self, on: bool) -> bool {
        if self.state.recording == on {
            debug!(recording = on, "recording state unchanged");
            return false;
        }
        self.toggle_recording();
        true
    }

    /// Stop an active recording and let the backend finalize it.
    pub fn finish_recording(&mut self) {
        self.set_recording(false);
        report("finish_recording", self.backend.finish_recording());
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .finish()
    }
}

fn report(op: &'static str, result: Result<()>) {
    if let Err(err) = result {
        warn!(op, %err, "actuation command failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::GatewayError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Rotate(i16, i16),
        Zoom(u8, u8),
        Center,
        Snapshot,
        Toggle,
        Finish,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
        fail: bool,
    }

    impl Recorder {
        fn push(&self, call: Call) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(GatewayError::Io(std::io::Error::other("unplugged")));
            }
            Ok(())
        }
    }

    impl Gimbal for Recorder {
        fn rotate(&mut self, yaw: i16, pitch: i16) -> Result<()> {
            self.push(Call::Rotate(yaw, pitch))
        }
        fn set_zoom(&mut self, integer: u8, decimal: u8) -> Result<()> {
            self.push(Call::Zoom(integer, decimal))
        }
        fn center(&mut self) -> Result<()> {
            self.push(Call::Center)
        }
    }

    impl Camera for Recorder {
        fn save_snapshot(&mut self) -> Result<()> {
            self.push(Call::Snapshot)
        }
        fn toggle_recording(&mut self) -> Result<()> {
            self.push(Call::Toggle)
        }
        fn finish_recording(&mut self) -> Result<()> {
            self.push(Call::Finish)
        }
    }

    impl Backend for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[test]
    fn center_is_idempotent() {
        let recorder = Recorder::default();
        let mut device = Device::new(Box::new(recorder.clone()));
        device.rotate(120, -40);

        device.center();
        let once = device.state();
        device.center();
        assert_eq!(device.state(), once);
        assert_eq!((once.yaw, once.pitch), (0, 0));
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![Call::Rotate(120, -40), Call::Center, Call::Center]
        );
    }

    #[test]
    fn reset_centers_then_zooms_out() {
        let recorder = Recorder::default();
        let mut device = Device::new(Box::new(recorder.clone()));
        device.rotate(300, 150);
        device.set_zoom(3, 5);

        device.reset();
        assert_eq!(device.state(), DeviceState::default());
        assert_eq!(
            recorder.calls.lock().unwrap()[2..],
            [Call::Center, Call::Zoom(1, 0)]
        );
    }

    #[test]
    fn toggle_recording_alternates() {
        let mut device = Device::null();
        assert!(!device.is_recording());
        device.toggle_recording();
        assert!(device.is_recording());
        device.toggle_recording();
        assert!(!device.is_recording());
    }

    #[test]
    fn set_recording_only_toggles_on_change() {
        let recorder = Recorder::default();
        let mut device = Device::new(Box::new(recorder.clone()));

        assert!(device.set_recording(true));
        assert!(!device.set_recording(true));
        assert!(device.set_recording(false));
        assert!(!device.set_recording(false));
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![Call::Toggle, Call::Toggle]
        );
    }

    #[test]
    fn finish_recording_stops_active_recording() {
        let recorder = Recorder::default();
        let mut device = Device::new(Box::new(recorder.clone()));
        device.toggle_recording();
        device.finish_recording();

        assert!(!device.is_recording());
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![Call::Toggle, Call::Toggle, Call::Finish]
        );
    }

    #[test]
    fn backend_failures_do_not_propagate() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut device = Device::new(Box::new(recorder));
        device.set_zoom(2, 5);
        device.save_snapshot();
        assert_eq!(device.state().zoom, (2, 5));
        assert_eq!(device.state().snapshots, 1);
    }

    #[test]
    fn null_backend_from_config() {
        let device = Device::from_config(&DeviceConfig::default()).unwrap();
        assert_eq!(device.backend_name(), "none");
    }
}
