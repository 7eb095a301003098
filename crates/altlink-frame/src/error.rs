use altlink_transport::TransportError;

/// Errors that can occur while framing commands or decoding telemetry.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A packet send failed; the rest of the frame was not sent.
    #[error("packet {index} of {total} failed to send: {source}")]
    Transport {
        index: usize,
        total: usize,
        #[source]
        source: TransportError,
    },

    /// Reading the next notification failed.
    #[error("notification receive failed: {0}")]
    Receive(#[source] TransportError),

    /// A configuration field is not a finite number.
    #[error("configuration field {field} is not a finite number")]
    InvalidConfiguration { field: &'static str },

    /// A configuration document could not be parsed or serialized.
    #[error("malformed configuration document: {0}")]
    MalformedConfiguration(#[from] serde_json::Error),

    /// An I/O error occurred on an async notification stream.
    #[error("notification I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The notification stream ended.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
