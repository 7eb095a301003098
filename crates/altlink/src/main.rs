mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "altlink", version, about = "Altimeter command and telemetry CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["altlink", "send", "/dev/rfcomm0", "CALIBRATE"])
            .expect("send args should parse");
        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn parses_configure_flags() {
        let cli = Cli::try_parse_from([
            "altlink",
            "configure",
            "/tmp/bridge.sock",
            "--movement-threshold",
            "25",
            "--sounder-duration",
            "250",
            "--no-verify",
        ])
        .expect("configure args should parse");

        let Command::Configure(args) = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(args.config.movement_threshold, Some(25.0));
        assert_eq!(args.config.sounder_duration, Some(250));
        assert!(args.no_verify);
    }

    #[test]
    fn decode_accepts_no_messages() {
        let cli = Cli::try_parse_from(["altlink", "--format", "json", "decode"])
            .expect("decode args should parse");
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert!(args.messages.is_empty());
    }

    #[test]
    fn rejects_non_numeric_sounder_type() {
        let err = Cli::try_parse_from(["altlink", "encode-config", "--sounder-type", "loud"])
            .expect_err("non-numeric value should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn encode_defaults_to_protocol_mtu() {
        let cli = Cli::try_parse_from(["altlink", "encode", "SOUND"])
            .expect("encode args should parse");
        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.frame.mtu, 20);
        assert_eq!(args.frame.chunk_budget, 18);
    }
}
