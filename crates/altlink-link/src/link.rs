use std::fmt;
use std::thread;
use std::time::Duration;

use altlink_frame::{
    Command, Configuration, FrameConfig, FrameEncoding, FrameError, FrameWriter, TelemetryEvent,
    TelemetryReader,
};
use altlink_transport::{NotificationSource, PacketTransport};
use tracing::{debug, error, info, warn};

use crate::error::{LinkError, Result};
use crate::session::{Session, SessionId};
use crate::window::{TelemetryWindow, DEFAULT_WINDOW_CAPACITY};

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_VERIFY_DELAY: Duration = Duration::from_secs(1);

/// Link behavior knobs.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub frame: FrameConfig,
    /// Request the device configuration right after connecting.
    pub fetch_config_on_connect: bool,
    /// Wait before the on-connect configuration request.
    pub settle_delay: Duration,
    /// Wait between saving a configuration and reading it back.
    pub verify_delay: Duration,
    /// Samples kept per telemetry series.
    pub window_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            fetch_config_on_connect: true,
            settle_delay: DEFAULT_SETTLE_DELAY,
            verify_delay: DEFAULT_VERIFY_DELAY,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

/// A connected device.
///
/// Command operations report success as `bool` and log the outcome; the
/// caller decides what to do with a failed send. Once disconnected, every
/// operation fails without touching the transport.
pub struct Link<W, R> {
    session: Session,
    writer: Option<FrameWriter<W>>,
    reader: Option<TelemetryReader<R>>,
    window: TelemetryWindow,
    config: LinkConfig,
}

impl<W, R> fmt::Debug for Link<W, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("session", &self.session.id())
            .field("state", &self.session.state())
            .finish_non_exhaustive()
    }
}

impl<W: PacketTransport, R: NotificationSource> Link<W, R> {
    /// Start a new session over an open write/notify pair.
    pub fn connect(sink: W, source: R, config: LinkConfig) -> Self {
        let session = Session::open();
        info!(session = %session.id(), "connected to device");

        let mut link = Self {
            session,
            writer: Some(FrameWriter::with_config(sink, config.frame.clone())),
            reader: Some(TelemetryReader::new(source)),
            window: TelemetryWindow::new(config.window_capacity),
            config,
        };

        if link.config.fetch_config_on_connect {
            if !link.config.settle_delay.is_zero() {
                thread::sleep(link.config.settle_delay);
            }
            link.request_configuration();
        }
        link
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Recent telemetry received on this session.
    pub fn window(&self) -> &TelemetryWindow {
        &self.window
    }

    /// Send a short text command such as `CALIBRATE`.
    pub fn send_command(&mut self, text: &str) -> bool {
        self.dispatch(Command::simple(text))
    }

    /// Send a configuration document (chunked on the wire).
    pub fn send_configuration(&mut self, config: &Configuration) -> bool {
        self.dispatch(Command::ConfigurationSet(*config))
    }

    pub fn calibrate(&mut self) -> bool {
        let sent = self.dispatch(Command::calibrate());
        if sent {
            info!("calibration requested, keep the device still");
        }
        sent
    }

    pub fn test_sound(&mut self) -> bool {
        self.dispatch(Command::sound())
    }

    pub fn request_configuration(&mut self) -> bool {
        self.dispatch(Command::ConfigurationGet)
    }

    /// Send a configuration, then ask the device to report it back.
    ///
    /// Returns whether the configuration itself was sent; the read-back
    /// arrives later as a [`TelemetryEvent::ConfigurationReport`].
    pub fn save_configuration(&mut self, config: &Configuration) -> bool {
        if !self.send_configuration(config) {
            return false;
        }
        if !self.config.verify_delay.is_zero() {
            thread::sleep(self.config.verify_delay);
        }
        if !self.request_configuration() {
            warn!(session = %self.session.id(), "configuration saved but read-back request failed");
        }
        true
    }

    /// Receive the next telemetry event (blocking).
    ///
    /// End of stream or a receive failure ends the session and returns
    /// [`LinkError::Disconnected`]. A malformed configuration report is
    /// returned as an error but leaves the link usable.
    pub fn recv_event(&mut self) -> Result<TelemetryEvent> {
        let reader = self.reader.as_mut().ok_or(LinkError::NotConnected)?;

        match reader.next_event() {
            Ok(event) => {
                self.window.record(&event);
                Ok(event)
            }
            Err(FrameError::ConnectionClosed) => {
                self.invalidate("device closed the connection");
                Err(LinkError::Disconnected(self.session.id()))
            }
            Err(FrameError::Receive(source)) => {
                warn!(session = %self.session.id(), error = %source, "receive failed");
                self.invalidate("receive failed");
                Err(LinkError::Disconnected(self.session.id()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// End the session. Idempotent.
    pub fn disconnect(&mut self) {
        self.invalidate("disconnect requested");
    }

    fn invalidate(&mut self, reason: &str) {
        self.writer = None;
        self.reader = None;
        self.window.clear();
        if self.session.invalidate() {
            info!(
                session = %self.session.id(),
                reason,
                duration_ms = self.session.duration().as_millis() as u64,
                "disconnected from device"
            );
        }
    }

    fn dispatch(&mut self, command: Command) -> bool {
        let Some(writer) = self.writer.as_mut() else {
            error!(session = %self.session.id(), "not connected to device");
            return false;
        };

        match writer.send_command(&command) {
            Ok(FrameEncoding::Chunked { payload_len, chunks }) => {
                info!(
                    session = %self.session.id(),
                    payload_len,
                    chunks,
                    "sent configuration data in chunks"
                );
                true
            }
            Ok(encoding) => {
                debug!(session = %self.session.id(), ?command, ?encoding, "command sent");
                true
            }
            Err(err) => {
                error!(session = %self.session.id(), ?command, error = %err, "error sending command");
                false
            }
        }
    }
}
