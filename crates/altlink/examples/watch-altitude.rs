//! Print altitude readings with a rolling min/max from the telemetry window.
//!
//! Run with:
//!   cargo run --example watch-altitude --features link -- /dev/rfcomm0

use altlink::frame::TelemetryEvent;
use altlink::link::{connect, LinkError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: watch-altitude <DEVICE>")?;

    let mut link = connect(&path)?;
    eprintln!("Connected to {path} ({})", link.id());

    loop {
        match link.recv_event() {
            Ok(TelemetryEvent::Altitude(meters)) => {
                let (min, max) = link
                    .window()
                    .altitude()
                    .fold((f64::MAX, f64::MIN), |(lo, hi), s| {
                        (lo.min(s.value), hi.max(s.value))
                    });
                println!("{meters:8.2} m   window {min:.2}..{max:.2}");
            }
            Ok(TelemetryEvent::ConfigurationReport(config)) => {
                eprintln!("Device configuration: {config:?}");
            }
            Ok(_) => {}
            Err(LinkError::Disconnected(id)) => {
                eprintln!("{id} ended");
                break;
            }
            Err(e) => eprintln!("Skipping message: {e}"),
        }
    }

    Ok(())
}
