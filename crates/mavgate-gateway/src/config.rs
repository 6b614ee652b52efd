//! Gateway configuration.
//!
//! Loaded from a TOML file with `[serial]`, `[server]`, `[rc]`, `[device]`
//! and `[heartbeat]` sections. Every field has a default, so an empty file
//! is valid; the serial path must still be supplied somewhere before the
//! gateway can start.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mavgate_transport::{SerialConfig, DEFAULT_FIFO_PATH, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::pidfile::DEFAULT_PID_FILE;
use crate::siyi::{DEFAULT_SIYI_IP, DEFAULT_SIYI_PORT};

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub serial: SerialSection,
    pub server: ServerSection,
    pub rc: RcConfig,
    pub device: DeviceConfig,
    pub heartbeat: HeartbeatConfig,
}

impl GatewayConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| GatewayError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| GatewayError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(text) = &self.serial.config {
            text.parse::<SerialConfig>()?;
        }
        for (name, axis) in [
            ("yaw", &self.rc.yaw),
            ("pitch", &self.rc.pitch),
            ("zoom", &self.rc.zoom),
        ] {
            axis.validate(name)?;
        }
        if self.heartbeat.period_ms == 0 {
            return Err(invalid("heartbeat period_ms must be positive"));
        }
        Ok(())
    }

    /// Serial path, required in server mode.
    pub fn serial_path(&self) -> Result<&Path> {
        self.serial
            .path
            .as_deref()
            .ok_or_else(|| invalid("no serial port path configured"))
    }

    /// Parsed serial line settings, required in server mode.
    pub fn serial_config(&self) -> Result<SerialConfig> {
        let Some(text) = self.serial.config.as_deref() else {
            return Err(invalid("no serial port configuration string configured"));
        };
        Ok(text.parse()?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialSection {
    /// Device path, e.g. `/dev/ttyHS1`.
    pub path: Option<PathBuf>,
    /// Line settings, `baudrate[,parity[,data_bits[,stop_bits]]]`.
    pub config: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    /// TCP port. 0 binds an ephemeral port.
    pub port: u16,
    pub pid_file: PathBuf,
    pub command_fifo: PathBuf,
    /// Probe the flight controller before serving clients.
    pub wait_for_remote: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
            command_fifo: PathBuf::from(DEFAULT_FIFO_PATH),
            wait_for_remote: false,
        }
    }
}

/// Calibration for one RC channel. Only `channel` is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AxisConfig {
    /// 1-based channel number.
    pub channel: u8,
    #[serde(default = "default_pwm_min")]
    pub min: u16,
    #[serde(default = "default_pwm_mid")]
    pub mid: u16,
    #[serde(default = "default_pwm_max")]
    pub max: u16,
    #[serde(default)]
    pub reverse: bool,
}

fn default_pwm_min() -> u16 {
    1000
}

fn default_pwm_mid() -> u16 {
    1500
}

fn default_pwm_max() -> u16 {
    2000
}

impl AxisConfig {
    pub fn on_channel(channel: u8) -> Self {
        Self {
            channel,
            min: default_pwm_min(),
            mid: default_pwm_mid(),
            max: default_pwm_max(),
            reverse: false,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.channel == 0 {
            return Err(invalid(format!("rc.{name}.channel must be 1-based")));
        }
        if self.max <= self.min || self.mid < self.min || self.mid > self.max {
            return Err(invalid(format!("rc.{name} requires min <= mid <= max and min < max")));
        }
        Ok(())
    }
}

/// RC channel mapping for the gimbal control law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RcConfig {
    pub yaw: AxisConfig,
    pub pitch: AxisConfig,
    pub zoom: AxisConfig,
    pub center_button: u8,
    pub snapshot_button: u8,
    pub record_button: u8,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            yaw: AxisConfig::on_channel(1),
            pitch: AxisConfig::on_channel(2),
            zoom: AxisConfig::on_channel(9),
            center_button: 5,
            snapshot_button: 13,
            record_button: 14,
        }
    }
}

/// Which actuation backend to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum DeviceKind {
    #[serde(rename = "siyi")]
    Siyi,
    #[default]
    #[serde(rename = "none")]
    Null,
}

impl DeviceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Siyi => "siyi",
            Self::Null => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    pub ip: String,
    pub port: u16,
    /// Reported in CAMERA_INFORMATION replies.
    pub vendor_name: String,
    pub model_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Null,
            ip: DEFAULT_SIYI_IP.to_string(),
            port: DEFAULT_SIYI_PORT,
            vendor_name: "SIYI".to_string(),
            model_name: "A8-Mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub period_ms: u64,
}

impl HeartbeatConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self { period_ms: 1000 }
    }
}

fn invalid(message: impl Into<String>) -> GatewayError {
    GatewayError::Config(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.server.port, 8278);
        assert_eq!(config.rc.yaw.channel, 1);
        assert_eq!(config.rc.pitch.channel, 2);
        assert_eq!(config.rc.zoom.channel, 9);
        assert_eq!(config.rc.record_button, 14);
        assert_eq!(config.device.kind, DeviceKind::Null);
        config.validate().unwrap();
    }

    #[test]
    fn full_file_parses() {
        let text = r#"
            [serial]
            path = "/dev/ttyHS1"
            config = "921600,N,8,1"

            [server]
            port = 9000
            wait_for_remote = true

            [rc.yaw]
            channel = 4
            min = 982
            mid = 1494
            max = 2006
            reverse = true

            [rc]
            snapshot_button = 11

            [device]
            kind = "siyi"
            ip = "10.0.0.5"

            [heartbeat]
            period_ms = 500
        "#;
        let config: GatewayConfig = toml::from_str(text).unwrap();
        config.validate().unwrap();

        assert_eq!(config.serial_path().unwrap(), Path::new("/dev/ttyHS1"));
        assert_eq!(config.serial_config().unwrap().baudrate, 921600);
        assert_eq!(config.server.port, 9000);
        assert!(config.server.wait_for_remote);
        assert_eq!(config.rc.yaw.channel, 4);
        assert!(config.rc.yaw.reverse);
        assert_eq!(config.rc.pitch, AxisConfig::on_channel(2));
        assert_eq!(config.rc.snapshot_button, 11);
        assert_eq!(config.device.kind, DeviceKind::Siyi);
        assert_eq!(config.device.port, DEFAULT_SIYI_PORT);
        assert_eq!(config.heartbeat.period(), Duration::from_millis(500));
    }

    #[test]
    fn missing_serial_settings_are_reported() {
        let config = GatewayConfig::default();
        assert!(matches!(config.serial_path(), Err(GatewayError::Config(_))));
        assert!(matches!(
            config.serial_config(),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_serial_string() {
        let mut config = GatewayConfig::default();
        config.serial.config = Some("fast".to_string());
        assert!(matches!(
            config.validate(),
            Err(GatewayError::Transport(_))
        ));
    }

    #[test]
    fn rejects_degenerate_axis() {
        let mut config = GatewayConfig::default();
        config.rc.pitch.max = config.rc.pitch.min;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rc.pitch"));
    }

    #[test]
    fn axis_section_requires_channel() {
        let result: std::result::Result<GatewayConfig, _> =
            toml::from_str("[rc.pitch]\nmin = 900\n");
        assert!(result.is_err());

        let config: GatewayConfig = toml::from_str("[rc.pitch]\nchannel = 3\nmin = 900\n").unwrap();
        assert_eq!(config.rc.pitch.channel, 3);
        assert_eq!(config.rc.pitch.min, 900);
        assert_eq!(config.rc.pitch.max, 2000);
    }

    #[test]
    fn rejects_unknown_device_kind() {
        let result: std::result::Result<GatewayConfig, _> =
            toml::from_str("[device]\nkind = \"gopro\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_port_is_a_parse_error() {
        let result: std::result::Result<GatewayConfig, _> =
            toml::from_str("[server]\nport = 70000\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = std::env::temp_dir().join(format!("mavgate-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();

        let err = GatewayConfig::load(&path).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigParse { .. }));
        assert!(err.to_string().contains("bad.toml"));

        let missing = GatewayConfig::load(dir.join("missing.toml")).unwrap_err();
        assert!(matches!(missing, GatewayError::ConfigRead { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
