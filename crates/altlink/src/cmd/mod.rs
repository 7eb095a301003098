use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use altlink_frame::{Configuration, FrameConfig, TelemetryEvent};
use altlink_link::{DeviceLink, LinkConfig};
use clap::{Args, Subcommand};

use crate::exit::{link_error, CliError, CliResult, INTERNAL, TIMEOUT, USAGE};
use crate::output::OutputFormat;

pub mod configure;
pub mod decode;
pub mod encode;
pub mod encode_config;
pub mod get_config;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the packets a text command is sent as.
    Encode(EncodeArgs),
    /// Print the packets a configuration document is sent as.
    EncodeConfig(EncodeConfigArgs),
    /// Decode device messages (stdin lines when none are given).
    Decode(DecodeArgs),
    /// Send a text command to the device.
    Send(SendArgs),
    /// Save a configuration on the device.
    Configure(ConfigureArgs),
    /// Ask the device for its configuration and print it.
    GetConfig(GetConfigArgs),
    /// Print decoded telemetry until interrupted.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::EncodeConfig(args) => encode_config::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Configure(args) => configure::run(args, format),
        Command::GetConfig(args) => get_config::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Framing overrides shared by every command that produces packets.
#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Largest packet sent unsplit.
    #[arg(long, default_value_t = altlink_frame::MTU)]
    pub mtu: usize,
    /// Document bytes per configuration chunk.
    #[arg(long, default_value_t = altlink_frame::CHUNK_DATA_BUDGET)]
    pub chunk_budget: usize,
    /// Send packets back to back without inter-packet delays.
    #[arg(long)]
    pub no_pacing: bool,
}

impl FrameArgs {
    pub fn to_frame_config(&self) -> CliResult<FrameConfig> {
        if self.mtu == 0 || self.chunk_budget == 0 {
            return Err(CliError::new(
                USAGE,
                "--mtu and --chunk-budget must be greater than zero",
            ));
        }
        let config = FrameConfig {
            mtu: self.mtu,
            chunk_data_budget: self.chunk_budget,
            ..FrameConfig::default()
        };
        Ok(if self.no_pacing {
            config.without_pacing()
        } else {
            config
        })
    }
}

/// Configuration fields; unset flags keep the device defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Reference sea-level pressure in hPa.
    #[arg(long, value_name = "HPA")]
    pub sea_level_pressure: Option<f64>,
    /// Altitude change that counts as movement, in centimeters.
    #[arg(long, value_name = "CM")]
    pub movement_threshold: Option<f64>,
    /// IMU acceleration threshold in G.
    #[arg(long, value_name = "G")]
    pub accel_threshold: Option<f64>,
    /// Sounder pattern selector.
    #[arg(long)]
    pub sounder_type: Option<i64>,
    /// Sounder base frequency in Hz.
    #[arg(long, value_name = "HZ")]
    pub sounder_base_freq: Option<i64>,
    /// Sounder tone duration in ms.
    #[arg(long, value_name = "MS")]
    pub sounder_duration: Option<i64>,
}

impl ConfigArgs {
    pub fn apply(&self, base: Configuration) -> Configuration {
        Configuration {
            sea_level_pressure: self.sea_level_pressure.unwrap_or(base.sea_level_pressure),
            movement_threshold_cm: self
                .movement_threshold
                .unwrap_or(base.movement_threshold_cm),
            accel_threshold: self.accel_threshold.unwrap_or(base.accel_threshold),
            sounder_type: self.sounder_type.unwrap_or(base.sounder_type),
            sounder_base_freq: self.sounder_base_freq.unwrap_or(base.sounder_base_freq),
            sounder_duration: self.sounder_duration.unwrap_or(base.sounder_duration),
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command text, e.g. CALIBRATE.
    pub text: String,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct EncodeConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Messages to decode. Reads stdin lines when omitted.
    pub messages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Device node or bridge socket path.
    pub device: PathBuf,
    /// Command text, e.g. CALIBRATE or SOUND.
    pub text: String,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Device node or bridge socket path.
    pub device: PathBuf,
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Do not read the configuration back after saving.
    #[arg(long)]
    pub no_verify: bool,
    /// How long to wait for the read-back (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct GetConfigArgs {
    /// Device node or bridge socket path.
    pub device: PathBuf,
    /// How long to wait for the report (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Device node or bridge socket path.
    pub device: PathBuf,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Skip the configuration request sent after connecting.
    #[arg(long)]
    pub no_fetch: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Link settings for one-shot commands: no on-connect fetch.
pub fn oneshot_link_config(frame: FrameConfig) -> LinkConfig {
    LinkConfig {
        frame,
        fetch_config_on_connect: false,
        ..LinkConfig::default()
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Read events until the device reports its configuration.
///
/// The blocking read runs on its own thread so the wait can time out.
pub fn wait_for_configuration(mut link: DeviceLink, timeout: Duration) -> CliResult<Configuration> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        match link.recv_event() {
            Ok(TelemetryEvent::ConfigurationReport(config)) => {
                let _ = tx.send(Ok(config));
                return;
            }
            Ok(_) => continue,
            Err(err) => {
                let _ = tx.send(Err(link_error("configuration read-back failed", err)));
                return;
            }
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(CliError::new(
            TIMEOUT,
            format!("no configuration report within {timeout:?}"),
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(CliError::new(INTERNAL, "configuration reader stopped"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn config_args_overlay_base() {
        let args = ConfigArgs {
            movement_threshold: Some(25.0),
            sounder_duration: Some(300),
            ..ConfigArgs::default()
        };
        let config = args.apply(Configuration::default());
        assert_eq!(config.movement_threshold_cm, 25.0);
        assert_eq!(config.sounder_duration, 300);
        assert_eq!(config.sea_level_pressure, 1013.25);
    }

    #[test]
    fn frame_args_reject_zero_mtu() {
        let args = FrameArgs {
            mtu: 0,
            chunk_budget: 18,
            no_pacing: false,
        };
        assert_eq!(args.to_frame_config().unwrap_err().code, USAGE);
    }

    #[test]
    fn no_pacing_clears_delays() {
        let args = FrameArgs {
            mtu: 20,
            chunk_budget: 18,
            no_pacing: true,
        };
        let config = args.to_frame_config().unwrap();
        assert!(config.chunk_delay.is_zero());
        assert!(config.slice_delay.is_zero());
    }
}
