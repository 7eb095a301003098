//! Packet framing and telemetry decoding for the altimeter radio link.
//!
//! The link carries at most 20 bytes per packet and has no segmentation of
//! its own. This crate owns both directions of the protocol:
//! - outbound: commands become one packet, a `SC:` chunked configuration
//!   frame (`START:<len>`, `<i>:<chunk>`, `END`), or naive MTU slices
//! - inbound: each notification line is classified by prefix into a
//!   [`TelemetryEvent`]
//!
//! Delivery is trusted to the transport. There are no sequence numbers,
//! acknowledgements or retries; a failed packet aborts the whole frame.

pub mod codec;
pub mod configuration;
pub mod decode;
pub mod error;
pub mod reader;
pub mod vocab;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_writer;
#[cfg(feature = "async")]
pub mod line_codec;

pub use codec::{
    encode_command, serialize_command, Command, EncodedFrame, FrameConfig, FrameEncoding, Packet,
};
pub use configuration::Configuration;
pub use decode::{decode_message, MotionState, TelemetryEvent, Trend};
pub use error::{FrameError, Result};
pub use reader::TelemetryReader;
pub use vocab::{CHUNK_DATA_BUDGET, MTU};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_writer::AsyncFrameWriter;
#[cfg(feature = "async")]
pub use line_codec::TelemetryCodec;
