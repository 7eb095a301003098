//! Command and telemetry link for a BLE barometric altimeter.
//!
//! The device speaks a small text protocol over a radio link that carries
//! at most 20 bytes per packet. altlink frames outbound commands to fit,
//! decodes inbound telemetry, and keeps per-connection session state.
//!
//! # Crate Structure
//!
//! - [`transport`]: packet transport traits and line-based device adapters
//! - [`frame`]: command framing, configuration document, telemetry decoding
//! - [`link`]: session-scoped device link (behind `link` feature)

/// Re-export transport types.
pub mod transport {
    pub use altlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use altlink_frame::*;
}

/// Re-export link types (requires `link` feature).
#[cfg(feature = "link")]
pub mod link {
    pub use altlink_link::*;
}
