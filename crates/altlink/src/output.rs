use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use altlink_frame::{Configuration, EncodedFrame, FrameEncoding, TelemetryEvent};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    encoding: &'static str,
    payload_len: Option<usize>,
    packet_count: usize,
    packets: Vec<&'a str>,
}

#[derive(Serialize)]
struct EventOutput<'a> {
    kind: &'static str,
    value: Value,
    session: Option<&'a str>,
    timestamp: String,
}

#[derive(Serialize)]
struct ConfigurationOutput {
    sea_level_pressure: f64,
    movement_threshold_cm: f64,
    accel_threshold: f64,
    sounder_type: i64,
    sounder_base_freq: i64,
    sounder_duration: i64,
}

impl From<&Configuration> for ConfigurationOutput {
    fn from(config: &Configuration) -> Self {
        Self {
            sea_level_pressure: config.sea_level_pressure,
            movement_threshold_cm: config.movement_threshold_cm,
            accel_threshold: config.accel_threshold,
            sounder_type: config.sounder_type,
            sounder_base_freq: config.sounder_base_freq,
            sounder_duration: config.sounder_duration,
        }
    }
}

pub fn print_frame(frame: &EncodedFrame, format: OutputFormat) {
    let packets: Vec<&str> = frame.iter().map(|p| p.as_str().unwrap_or("")).collect();

    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                encoding: encoding_name(&frame.encoding),
                payload_len: match frame.encoding {
                    FrameEncoding::Chunked { payload_len, .. } => Some(payload_len),
                    _ => None,
                },
                packet_count: packets.len(),
                packets,
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
                .set_header(vec!["#", "SIZE", "PACKET"]);
            for (index, packet) in frame.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    packet.len().to_string(),
                    packets[index].to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} frame, {} packet(s)",
                encoding_name(&frame.encoding),
                packets.len()
            );
            for (index, packet) in packets.iter().enumerate() {
                println!("  [{index}] {packet}");
            }
        }
        OutputFormat::Raw => {
            let mut raw = Vec::new();
            for packet in frame.iter() {
                raw.extend_from_slice(packet.as_bytes());
                raw.push(b'\n');
            }
            print_raw(&raw);
        }
    }
}

pub fn print_event(event: &TelemetryEvent, session: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                kind: event.kind(),
                value: event_value(event),
                session,
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
                .set_header(vec!["KIND", "VALUE"])
                .add_row(vec![event.kind().to_string(), event.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{:<16} {event}", event.kind());
        }
        OutputFormat::Raw => {
            println!("{event}");
        }
    }
}

pub fn print_configuration(config: &Configuration, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&ConfigurationOutput::from(config))
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SETTING", "VALUE"]);
            for (name, value) in configuration_rows(config) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (name, value) in configuration_rows(config) {
                println!("{name:<22} {value}");
            }
        }
        OutputFormat::Raw => match config.to_wire_json() {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", TelemetryEvent::ConfigurationReport(*config)),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn encoding_name(encoding: &FrameEncoding) -> &'static str {
    match encoding {
        FrameEncoding::Single => "single",
        FrameEncoding::Chunked { .. } => "chunked",
        FrameEncoding::Sliced { .. } => "sliced",
    }
}

fn event_value(event: &TelemetryEvent) -> Value {
    match event {
        TelemetryEvent::Altitude(m) => json!({ "meters": m }),
        TelemetryEvent::ElevationChange { cm, trend } => {
            json!({ "centimeters": cm, "trend": trend.as_str() })
        }
        TelemetryEvent::Motion(state) => {
            json!({ "state": state.token(), "unstable": state.is_unstable() })
        }
        TelemetryEvent::Acceleration(g) => json!({ "g": g }),
        TelemetryEvent::ConfigurationReport(config) => {
            serde_json::to_value(ConfigurationOutput::from(config)).unwrap_or(Value::Null)
        }
        TelemetryEvent::Unrecognized(raw) => json!({ "raw": raw }),
    }
}

fn configuration_rows(config: &Configuration) -> [(&'static str, String); 6] {
    [
        (
            "sea_level_pressure",
            format!("{} hPa", config.sea_level_pressure),
        ),
        (
            "movement_threshold",
            format!("{} cm", config.movement_threshold_cm),
        ),
        ("accel_threshold", format!("{} G", config.accel_threshold)),
        ("sounder_type", config.sounder_type.to_string()),
        ("sounder_base_freq", format!("{} Hz", config.sounder_base_freq)),
        ("sounder_duration", format!("{} ms", config.sounder_duration)),
    ]
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
