//! Async telemetry monitor over a bridge socket.
//!
//! Requests the device configuration, then prints every decoded event.
//!
//! Run with:
//!   cargo run --example async-monitor --features link,async -- /tmp/altlink-bridge.sock

#[cfg(unix)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use altlink::frame::{AsyncFrameWriter, Command, TelemetryCodec, TelemetryEvent};
    use altlink::transport::AsyncLineSink;
    use futures_util::StreamExt;
    use tokio::net::UnixStream;
    use tokio_util::codec::FramedRead;

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: async-monitor <SOCKET>")?;

    let stream = UnixStream::connect(&path).await?;
    let (read_half, write_half) = stream.into_split();
    eprintln!("Connected to {path}");

    let mut writer = AsyncFrameWriter::new(AsyncLineSink::new(write_half));
    writer.send_command(&Command::ConfigurationGet).await?;

    let mut events = FramedRead::new(read_half, TelemetryCodec::new());
    while let Some(event) = events.next().await {
        match event? {
            TelemetryEvent::ConfigurationReport(config) => {
                eprintln!("Device configuration: {config:?}");
            }
            event => println!("{:<16} {event}", event.kind()),
        }
    }

    eprintln!("Bridge closed");
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("async-monitor requires Unix domain sockets");
}
