use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mavgate_frame::message::{
    AutopilotVersion, CommandAck, CommandLong, GpsRawInt, Heartbeat, Message, Ping, RcChannels,
};
use mavgate_frame::msgid::{self, message_name};
use mavgate_frame::Frame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    msg_id: u8,
    name: &'a str,
    seq: u16,
    payload_size: usize,
    summary: String,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                msg_id: frame.msg_id,
                name: message_name(frame.msg_id),
                seq: frame.seq,
                payload_size: frame.payload.len(),
                summary: summarize(frame),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "ID", "SEQ", "SIZE", "SUMMARY"])
                .add_row(vec![
                    message_name(frame.msg_id).to_string(),
                    frame.msg_id.to_string(),
                    frame.seq.to_string(),
                    frame.payload.len().to_string(),
                    summarize(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} ({}) seq={} size={} {}",
                message_name(frame.msg_id),
                frame.msg_id,
                frame.seq,
                frame.payload.len(),
                summarize(frame)
            );
        }
    }
}

/// One-line rendering of the decoded payload. Messages without a codec
/// render as hex.
pub fn summarize(frame: &Frame) -> String {
    let payload = frame.payload.as_ref();
    match frame.msg_id {
        msgid::HEARTBEAT => {
            let hb = Heartbeat::decode(payload);
            format!(
                "type={} autopilot={} status={}",
                hb.mav_type, hb.autopilot, hb.system_status
            )
        }
        msgid::PING => {
            let ping = Ping::decode(payload);
            format!("time_usec={} seq={}", ping.time_usec, ping.seq)
        }
        msgid::GPS_RAW_INT => {
            let gps = GpsRawInt::decode(payload);
            format!(
                "fix={} sats={} lat={:.7} lon={:.7} alt_m={:.2}",
                gps.fix_type,
                gps.satellites_visible,
                f64::from(gps.lat) / 1e7,
                f64::from(gps.lon) / 1e7,
                f64::from(gps.alt) / 1000.0
            )
        }
        msgid::RC_CHANNELS => {
            let rc = RcChannels::decode(payload);
            let shown = usize::from(rc.chancount).min(rc.chan_raw.len());
            let channels: Vec<String> = rc.chan_raw[..shown].iter().map(u16::to_string).collect();
            format!("rssi={} channels=[{}]", rc.rssi, channels.join(","))
        }
        msgid::COMMAND_LONG => {
            let cmd = CommandLong::decode(payload);
            format!(
                "command={} target={}/{}",
                cmd.command, cmd.target_system, cmd.target_component
            )
        }
        msgid::COMMAND_ACK => {
            let ack = CommandAck::decode(payload);
            format!("command={} result={}", ack.command, ack.result)
        }
        msgid::AUTOPILOT_VERSION => {
            let version = AutopilotVersion::decode(payload);
            format!(
                "system_id={} flight_sw={:#x}",
                version.system_id, version.flight_sw_version
            )
        }
        _ => hex_preview(payload),
    }
}

fn hex_preview(payload: &[u8]) -> String {
    const MAX_SHOWN: usize = 32;
    let mut out: String = payload
        .iter()
        .take(MAX_SHOWN)
        .map(|b| format!("{b:02x}"))
        .collect();
    if payload.len() > MAX_SHOWN {
        out.push_str("..");
    }
    out
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
