#![cfg(all(unix, feature = "cli"))]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/altlink-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Accept one connection on a fresh bridge socket and hand it to `device`.
fn fake_device<F, T>(tag: &str, device: F) -> (PathBuf, PathBuf, JoinHandle<T>)
where
    F: FnOnce(BufReader<UnixStream>, UnixStream) -> T + Send + 'static,
    T: Send + 'static,
{
    let dir = unique_temp_dir(tag);
    let sock_path = dir.join("bridge.sock");
    let listener = UnixListener::bind(&sock_path).expect("listener should bind");

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("listener should accept");
        let reader = BufReader::new(stream.try_clone().expect("stream should clone"));
        device(reader, stream)
    });
    (dir, sock_path, handle)
}

fn altlink(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_altlink"));
    cmd.args(["--log-level", "error", "--format", "json"]).args(args);
    cmd
}

fn run(args: &[&str]) -> Output {
    altlink(args).output().expect("altlink should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout should be json lines"))
        .collect()
}

#[test]
fn encode_short_command_is_single_packet() {
    let output = run(&["encode", "CALIBRATE"]);
    assert!(output.status.success());

    let frame = &json_lines(&output)[0];
    assert_eq!(frame["encoding"], "single");
    assert_eq!(frame["packets"], serde_json::json!(["CALIBRATE"]));
}

#[test]
fn encode_long_command_is_sliced() {
    let output = run(&["encode", "ABCDEFGHIJKLMNOPQRSTUVWXYZ"]);
    assert!(output.status.success());

    let frame = &json_lines(&output)[0];
    assert_eq!(frame["encoding"], "sliced");
    assert_eq!(
        frame["packets"],
        serde_json::json!(["ABCDEFGHIJKLMNOPQRST", "UVWXYZ"])
    );
}

#[test]
fn encode_config_is_chunked() {
    let output = run(&["encode-config", "--movement-threshold", "25"]);
    assert!(output.status.success());

    let frame = &json_lines(&output)[0];
    assert_eq!(frame["encoding"], "chunked");
    let packets: Vec<&str> = frame["packets"]
        .as_array()
        .expect("packets should be an array")
        .iter()
        .map(|p| p.as_str().expect("packet should be text"))
        .collect();
    assert!(packets[0].starts_with("SC:START:"));
    assert_eq!(packets.last().copied(), Some("SC:END"));
    let document: String = packets[1..packets.len() - 1]
        .iter()
        .map(|p| p.splitn(3, ':').nth(2).expect("chunk should carry data"))
        .collect();
    assert!(document.contains("\"MOVEMENT_THRESHOLD\":0.25"));
    assert_eq!(
        frame["payload_len"].as_u64(),
        Some(document.len() as u64)
    );
}

#[test]
fn encode_config_rejects_non_finite_values() {
    let output = run(&["encode-config", "--sea-level-pressure", "NaN"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_arguments() {
    let output = run(&["decode", "A:123.45", "C:-4", "M:DRIFT", "A:garbage", "hello"]);
    assert!(output.status.success());

    let events = json_lines(&output);
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["kind"].as_str().expect("kind should be text"))
        .collect();
    assert_eq!(kinds, vec!["altitude", "elevation_change", "motion", "unrecognized"]);
    assert_eq!(events[0]["value"]["meters"], 123.45);
    assert_eq!(events[1]["value"]["trend"], "falling");
    assert_eq!(events[2]["value"]["unstable"], true);
}

#[test]
fn decode_stdin_flags_malformed_configuration() {
    let mut child = altlink(&["decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"G:1.01\r\nCFG:{oops\n\nCFG:{\"SOUNDER_TYPE\":1}\n")
        .expect("stdin should accept input");
    let output = child.wait_with_output().expect("decode should finish");

    assert_eq!(output.status.code(), Some(60));
    let events = json_lines(&output);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "acceleration");
    assert_eq!(events[1]["kind"], "configuration");
    assert_eq!(events[1]["value"]["sounder_type"], 1);
    assert_eq!(events[1]["value"]["movement_threshold_cm"], 10.0);
}

#[test]
fn send_writes_command_line() {
    let (dir, sock_path, device) = fake_device("send", |mut reader, _writer| {
        let mut line = String::new();
        reader.read_line(&mut line).expect("should read command");
        line
    });

    let output = run(&["send", sock_path.to_str().expect("utf-8 path"), "SOUND"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(device.join().expect("device should finish"), "SOUND\n");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_device_is_transport_error() {
    let dir = unique_temp_dir("missing");
    let missing = dir.join("nope.sock");
    let output = run(&["send", missing.to_str().expect("utf-8 path"), "SOUND"]);
    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn get_config_prints_reported_configuration() {
    let (dir, sock_path, device) = fake_device("get-config", |mut reader, mut writer| {
        let mut line = String::new();
        reader.read_line(&mut line).expect("should read request");
        assert_eq!(line, "GET_CONFIG\n");
        writer
            .write_all(b"A:10.0\nCFG:{\"MOVEMENT_THRESHOLD\":0.3,\"SOUNDER_BASE_FREQ\":1000}\n")
            .expect("should write report");
    });

    let output = run(&["get-config", sock_path.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "{output:?}");
    device.join().expect("device should finish");

    let config = &json_lines(&output)[0];
    assert_eq!(config["movement_threshold_cm"], 30.0);
    assert_eq!(config["sounder_base_freq"], 1000);
    assert_eq!(config["sea_level_pressure"], 1013.25);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn get_config_times_out_without_report() {
    let (dir, sock_path, device) = fake_device("timeout", |mut reader, _writer| {
        let mut line = String::new();
        reader.read_line(&mut line).expect("should read request");
        // Stay connected until the client gives up.
        let mut rest = String::new();
        let _ = reader.read_line(&mut rest);
    });

    let output = run(&[
        "get-config",
        sock_path.to_str().expect("utf-8 path"),
        "--timeout",
        "300ms",
    ]);
    assert_eq!(output.status.code(), Some(124));
    device.join().expect("device should finish");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn configure_sends_chunks_and_verifies() {
    let (dir, sock_path, device) = fake_device("configure", |mut reader, mut writer| {
        let mut document = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("should read packet");
            let line = line.trim_end();
            if line == "SC:END" {
                break;
            }
            if line.starts_with("SC:START:") {
                continue;
            }
            let data = line.splitn(3, ':').nth(2).expect("chunk should carry data");
            document.push_str(data);
        }

        let mut request = String::new();
        reader.read_line(&mut request).expect("should read read-back");
        assert_eq!(request, "GET_CONFIG\n");
        writer
            .write_all(format!("CFG:{document}\n").as_bytes())
            .expect("should report configuration");
        document
    });

    let output = run(&[
        "configure",
        sock_path.to_str().expect("utf-8 path"),
        "--movement-threshold",
        "25",
        "--sounder-duration",
        "250",
        "--no-pacing",
    ]);
    assert!(output.status.success(), "{output:?}");

    let document = device.join().expect("device should finish");
    assert!(document.contains("\"MOVEMENT_THRESHOLD\":0.25"));
    let config = &json_lines(&output)[0];
    assert_eq!(config["movement_threshold_cm"], 25.0);
    assert_eq!(config["sounder_duration"], 250);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_prints_requested_number_of_events() {
    let (dir, sock_path, device) = fake_device("monitor", |_reader, mut writer| {
        writer
            .write_all(b"A:100.5\nbad\nG:0.97\nA:101.0\n")
            .expect("should write telemetry");
    });

    let output = run(&[
        "monitor",
        sock_path.to_str().expect("utf-8 path"),
        "--no-fetch",
        "--count",
        "3",
    ]);
    assert!(output.status.success(), "{output:?}");
    device.join().expect("device should finish");

    let events = json_lines(&output);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["kind"], "altitude");
    assert_eq!(events[1]["kind"], "unrecognized");
    assert_eq!(events[2]["kind"], "acceleration");
    assert!(events[0]["session"]
        .as_str()
        .expect("session should be text")
        .starts_with("session-"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_fails_when_device_ends_early() {
    let (dir, sock_path, device) = fake_device("monitor-eof", |_reader, mut writer| {
        writer.write_all(b"A:1.0\n").expect("should write telemetry");
    });

    let output = run(&[
        "monitor",
        sock_path.to_str().expect("utf-8 path"),
        "--no-fetch",
        "--count",
        "5",
    ]);
    device.join().expect("device should finish");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json_lines(&output).len(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_reports_package_version() {
    let output = run(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("altlink {}", env!("CARGO_PKG_VERSION"))
    );
}
