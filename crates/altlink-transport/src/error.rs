use std::path::PathBuf;

/// Errors that can occur while moving packets over the radio link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device or bridge socket.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A notification was not valid UTF-8 text.
    #[error("notification is not valid UTF-8 ({len} bytes)")]
    InvalidText { len: usize },

    /// The link is not connected.
    #[error("not connected to device")]
    NotConnected,

    /// The peer closed the link while a packet was being written.
    #[error("link closed by peer")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
