use std::thread;

use altlink_transport::PacketTransport;
use tracing::{debug, trace};

use crate::codec::{encode_command, Command, EncodedFrame, FrameConfig, FrameEncoding};
use crate::error::{FrameError, Result};

/// Sends command frames over a [`PacketTransport`], one packet at a time.
///
/// Packets of a frame go out strictly in order with the frame's pacing
/// delay between them. The first failed packet aborts the frame; nothing
/// is retried, since a repeated `START` after some chunks would corrupt
/// the device's reassembly.
pub struct FrameWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: PacketTransport> FrameWriter<T> {
    /// Create a writer using the transport's MTU and default pacing.
    pub fn new(inner: T) -> Self {
        let config = FrameConfig {
            mtu: inner.mtu(),
            ..FrameConfig::default()
        };
        Self::with_config(inner, config)
    }

    /// Create a writer with explicit framing configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Encode and transmit a command (blocking for the pacing delays).
    pub fn send_command(&mut self, command: &Command) -> Result<FrameEncoding> {
        let frame = encode_command(command, &self.config)?;
        self.transmit(&frame)?;
        Ok(frame.encoding)
    }

    /// Transmit an already encoded frame.
    pub fn transmit(&mut self, frame: &EncodedFrame) -> Result<()> {
        let total = frame.len();
        let delay = frame.encoding.packet_delay(&self.config);
        debug!(total, encoding = ?frame.encoding, "transmitting frame");

        for (index, packet) in frame.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            trace!(index, total, ?packet, "sending packet");
            self.inner
                .send_packet(packet.as_bytes())
                .map_err(|source| FrameError::Transport {
                    index,
                    total,
                    source,
                })?;
        }

        Ok(())
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current framing configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
