use crate::session::SessionId;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] altlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] altlink_frame::FrameError),

    /// The link was used after it was disconnected.
    #[error("not connected to device")]
    NotConnected,

    /// The device went away; the session is no longer usable.
    #[error("{0} disconnected")]
    Disconnected(SessionId),
}

pub type Result<T> = std::result::Result<T, LinkError>;
