use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::configuration::Configuration;
use crate::error::Result;
use crate::vocab::{
    CHUNK_DATA_BUDGET, CHUNK_END, CHUNK_PACKET_DELAY, CHUNK_START, CHUNK_TAG, CMD_CALIBRATE,
    CMD_GET_CONFIG, CMD_SET_CONFIG, CMD_SOUND, MTU, SLICE_PACKET_DELAY,
};

/// A logical outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Opaque short instruction such as `CALIBRATE`.
    Simple(String),
    /// Ask the device to report its configuration.
    ConfigurationGet,
    /// Write a configuration document to the device.
    ConfigurationSet(Configuration),
}

impl Command {
    pub fn simple(text: impl Into<String>) -> Self {
        Self::Simple(text.into())
    }

    pub fn calibrate() -> Self {
        Self::simple(CMD_CALIBRATE)
    }

    pub fn sound() -> Self {
        Self::simple(CMD_SOUND)
    }
}

/// One radio packet. Cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet(Bytes);

impl Packet {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The packet as text. Every packet the encoder builds is UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => write!(f, "Packet({text:?})"),
            None => write!(f, "Packet(<binary {} bytes>)", self.0.len()),
        }
    }
}

/// How a command was laid out over packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEncoding {
    /// The serialized command fit in one packet.
    Single,
    /// `SC:START:<len>`, indexed `SC:<i>:<chunk>` packets, `SC:END`.
    Chunked { payload_len: usize, chunks: usize },
    /// MTU-sized slices with no markers. The device is not known to
    /// reassemble these.
    Sliced { slices: usize },
}

impl FrameEncoding {
    /// Mandatory pause between consecutive packets of the frame.
    pub fn packet_delay(&self, config: &FrameConfig) -> Duration {
        match self {
            FrameEncoding::Single => Duration::ZERO,
            FrameEncoding::Chunked { .. } => config.chunk_delay,
            FrameEncoding::Sliced { .. } => config.slice_delay,
        }
    }
}

/// The ordered packets for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub encoding: FrameEncoding,
    pub packets: Vec<Packet>,
}

impl EncodedFrame {
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Packet> {
        self.packets.iter()
    }
}

/// Framing limits and pacing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest command sent as a single packet; also the naive slice size.
    pub mtu: usize,
    /// Document bytes per indexed chunk packet.
    pub chunk_data_budget: usize,
    /// Pause between packets of a chunked configuration frame.
    pub chunk_delay: Duration,
    /// Pause between packets of a sliced command.
    pub slice_delay: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            mtu: MTU,
            chunk_data_budget: CHUNK_DATA_BUDGET,
            chunk_delay: CHUNK_PACKET_DELAY,
            slice_delay: SLICE_PACKET_DELAY,
        }
    }
}

impl FrameConfig {
    /// Same limits with all pacing removed. Useful for loopback links.
    pub fn without_pacing(self) -> Self {
        Self {
            chunk_delay: Duration::ZERO,
            slice_delay: Duration::ZERO,
            ..self
        }
    }
}

/// Serialize a command to its on-wire text.
pub fn serialize_command(command: &Command) -> Result<String> {
    match command {
        Command::Simple(text) => Ok(text.clone()),
        Command::ConfigurationGet => Ok(CMD_GET_CONFIG.to_string()),
        Command::ConfigurationSet(config) => {
            Ok(format!("{CMD_SET_CONFIG}{}", config.to_wire_json()?))
        }
    }
}

/// Encode a command into the packets that carry it.
///
/// ```text
/// fits in MTU      -> GET_CONFIG
/// SET_CONFIG: > MTU -> SC:START:130 | SC:0:{"SEA_LEVEL_PRES | ... | SC:END
/// anything else    -> <20 bytes> | <20 bytes> | <rest>
/// ```
pub fn encode_command(command: &Command, config: &FrameConfig) -> Result<EncodedFrame> {
    let serialized = serialize_command(command)?;

    if serialized.len() <= config.mtu {
        return Ok(EncodedFrame {
            encoding: FrameEncoding::Single,
            packets: vec![Packet::new(serialized)],
        });
    }

    match serialized.strip_prefix(CMD_SET_CONFIG) {
        Some(document) => Ok(encode_chunked(document, config.chunk_data_budget)),
        None => Ok(encode_sliced(&serialized, config.mtu)),
    }
}

fn encode_chunked(document: &str, budget: usize) -> EncodedFrame {
    let chunks = split_utf8(document, budget);
    let mut packets = Vec::with_capacity(chunks.len() + 2);

    packets.push(Packet::new(format!(
        "{CHUNK_TAG}{CHUNK_START}{}",
        document.len()
    )));
    for (index, chunk) in chunks.iter().enumerate() {
        packets.push(Packet::new(format!("{CHUNK_TAG}{index}:{chunk}")));
    }
    packets.push(Packet::new(format!("{CHUNK_TAG}{CHUNK_END}")));

    EncodedFrame {
        encoding: FrameEncoding::Chunked {
            payload_len: document.len(),
            chunks: chunks.len(),
        },
        packets,
    }
}

fn encode_sliced(serialized: &str, mtu: usize) -> EncodedFrame {
    let packets: Vec<Packet> = split_utf8(serialized, mtu)
        .into_iter()
        .map(|slice| Packet::new(slice.to_owned()))
        .collect();
    EncodedFrame {
        encoding: FrameEncoding::Sliced {
            slices: packets.len(),
        },
        packets,
    }
}

/// Split `text` into pieces of at most `max_len` bytes without cutting a
/// UTF-8 sequence. A single character wider than `max_len` stays whole.
fn split_utf8(text: &str, max_len: usize) -> Vec<&str> {
    let max_len = max_len.max(1);
    let mut pieces = Vec::with_capacity(text.len().div_ceil(max_len));
    let mut rest = text;

    while !rest.is_empty() {
        let mut end = max_len.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(end);
        pieces.push(head);
        rest = tail;
    }

    pieces
}
