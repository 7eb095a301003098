//! Session-scoped link to the altimeter device.
//!
//! This is the "just works" layer. Open the radio bridge, send commands
//! and configuration, and read decoded telemetry. All per-connection state
//! lives in a [`Link`] and its [`Session`]; once a link is disconnected it
//! stays disconnected and a new connection gets a new session.

pub mod connector;
pub mod error;
pub mod link;
pub mod session;
pub mod window;

pub use connector::{connect, connect_with_config, DeviceLink};
pub use error::{LinkError, Result};
pub use link::{Link, LinkConfig};
pub use session::{Session, SessionId, SessionState};
pub use window::{Sample, TelemetryWindow, DEFAULT_WINDOW_CAPACITY};
