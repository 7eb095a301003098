use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::decode::{decode_message, TelemetryEvent};
use crate::error::{FrameError, Result};

const DEFAULT_MAX_LINE_LEN: usize = 4 * 1024;

/// `tokio_util` decoder turning newline-delimited notifications into
/// telemetry events.
///
/// Stream errors end a `FramedRead`, so a malformed configuration report is
/// logged and skipped here rather than returned.
#[derive(Debug, Clone)]
pub struct TelemetryCodec {
    max_line_len: usize,
    scanned: usize,
}

impl Default for TelemetryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCodec {
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            max_line_len,
            scanned: 0,
        }
    }

    fn decode_line(&self, line: &[u8]) -> Option<TelemetryEvent> {
        let Ok(text) = std::str::from_utf8(line) else {
            debug!(len = line.len(), "skipping non-UTF-8 notification");
            return None;
        };
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return None;
        }
        debug!(message = %text, "notification received");

        match decode_message(text) {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                trace!(message = %text, "dropped corrupt sample");
                None
            }
            Err(err) => {
                warn!(error = %err, "error parsing configuration");
                None
            }
        }
    }
}

impl Decoder for TelemetryCodec {
    type Item = TelemetryEvent;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelemetryEvent>> {
        loop {
            let Some(offset) = src[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = src.len();
                if src.len() > self.max_line_len {
                    return Err(FrameError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("notification longer than {} bytes", self.max_line_len),
                    )));
                }
                return Ok(None);
            };

            let line = src.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            if let Some(event) = self.decode_line(&line) {
                return Ok(Some(event));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<TelemetryEvent>> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }
        self.scanned = 0;
        if src.is_empty() {
            return Ok(None);
        }
        let line = src.split_to(src.len());
        Ok(self.decode_line(&line))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::decode::{MotionState, Trend};

    #[test]
    fn decodes_complete_lines_only() {
        let mut codec = TelemetryCodec::new();
        let mut buf = BytesMut::from(&b"A:12.3"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"4\nM:DRI");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(TelemetryEvent::Altitude(12.34))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"M:DRI");
    }

    #[test]
    fn skips_dropped_samples_and_bad_configuration() {
        let mut codec = TelemetryCodec::new();
        let mut buf = BytesMut::from(&b"A:nan?\nCFG:{oops\nC:-1\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(TelemetryEvent::ElevationChange {
                cm: -1.0,
                trend: Trend::Falling
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn rejects_overlong_lines() {
        let mut codec = TelemetryCodec::with_max_line_len(8);
        let mut buf = BytesMut::from(&b"A:123456789"[..]);
        assert!(matches!(codec.decode(&mut buf), Err(FrameError::Io(_))));
    }

    #[test]
    fn final_line_without_newline_decodes_at_eof() {
        let mut codec = TelemetryCodec::new();
        let mut buf = BytesMut::from(&b"G:0.25"[..]);
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some(TelemetryEvent::Acceleration(0.25))
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[tokio::test]
    async fn framed_read_yields_events() {
        let wire: &[u8] = b"A:1.5\r\nM:STABLE\nnoise\n";
        let events: Vec<_> = FramedRead::new(wire, TelemetryCodec::new())
            .map(|item| item.unwrap())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                TelemetryEvent::Altitude(1.5),
                TelemetryEvent::Motion(MotionState::Stable("STABLE".into())),
                TelemetryEvent::Unrecognized("noise".into()),
            ]
        );
    }
}
