use altlink_transport::{NotificationSource, TransportError};
use tracing::{debug, trace, warn};

use crate::decode::{decode_message, TelemetryEvent};
use crate::error::{FrameError, Result};

/// Reads notifications and turns them into telemetry events.
///
/// Corrupt numeric samples and notifications that are not valid UTF-8 are
/// dropped; a malformed configuration report is logged and returned as an
/// error since it answers a request.
pub struct TelemetryReader<S> {
    inner: S,
}

impl<S: NotificationSource> TelemetryReader<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Read the next event (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends.
    pub fn next_event(&mut self) -> Result<TelemetryEvent> {
        loop {
            let message = match self.inner.recv_notification() {
                Ok(Some(message)) => message,
                Ok(None) => return Err(FrameError::ConnectionClosed),
                Err(TransportError::InvalidText { len }) => {
                    debug!(len, "dropped non-UTF-8 notification");
                    continue;
                }
                Err(err) => return Err(FrameError::Receive(err)),
            };
            debug!(%message, "notification received");

            match decode_message(&message) {
                Ok(Some(TelemetryEvent::Unrecognized(raw))) => {
                    debug!(%raw, "unrecognized message");
                    return Ok(TelemetryEvent::Unrecognized(raw));
                }
                Ok(Some(event)) => return Ok(event),
                Ok(None) => {
                    trace!(%message, "dropped corrupt sample");
                }
                Err(err) => {
                    warn!(error = %err, "error parsing configuration");
                    return Err(err);
                }
            }
        }
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume the reader and return the source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
