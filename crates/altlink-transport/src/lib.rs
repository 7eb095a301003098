//! Packet and notification transport for the altimeter radio link.
//!
//! The radio exposes two halves of a UART-style characteristic pair:
//! - an outbound write of at most [`DEFAULT_MTU`] bytes per packet
//! - an inbound notification stream carrying one text message each
//!
//! This is the lowest layer of altlink. Connection management, pairing and
//! link-level timeouts belong to whatever implements these traits; the
//! protocol engine above only sends packets and receives messages.

pub mod device;
pub mod error;
pub mod line;
pub mod traits;

#[cfg(feature = "async")]
pub mod async_line;

pub use device::DeviceStream;
pub use error::{Result, TransportError};
pub use line::{LineSink, LineSource};
pub use traits::{NotificationSource, PacketTransport, DEFAULT_MTU};

#[cfg(feature = "async")]
pub use async_line::{AsyncLineSink, AsyncPacketTransport};
