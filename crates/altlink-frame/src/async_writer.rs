use altlink_transport::AsyncPacketTransport;
use tracing::{debug, trace};

use crate::codec::{encode_command, Command, EncodedFrame, FrameConfig, FrameEncoding};
use crate::error::{FrameError, Result};

/// Async counterpart of [`crate::FrameWriter`].
///
/// Each packet send is awaited before the next is issued, and the frame's
/// pacing delay is a `tokio::time::sleep` between them. Dropping the future
/// mid-frame leaves the device with a partial frame; callers should let a
/// started transmission run to completion.
pub struct AsyncFrameWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: AsyncPacketTransport> AsyncFrameWriter<T> {
    pub fn new(inner: T) -> Self {
        let config = FrameConfig {
            mtu: inner.mtu(),
            ..FrameConfig::default()
        };
        Self::with_config(inner, config)
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Encode and transmit a command.
    pub async fn send_command(&mut self, command: &Command) -> Result<FrameEncoding> {
        let frame = encode_command(command, &self.config)?;
        self.transmit(&frame).await?;
        Ok(frame.encoding)
    }

    /// Transmit an already encoded frame.
    pub async fn transmit(&mut self, frame: &EncodedFrame) -> Result<()> {
        let total = frame.len();
        let delay = frame.encoding.packet_delay(&self.config);
        debug!(total, encoding = ?frame.encoding, "transmitting frame");

        for (index, packet) in frame.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            trace!(index, total, ?packet, "sending packet");
            self.inner
                .send_packet(packet.as_bytes())
                .await
                .map_err(|source| FrameError::Transport {
                    index,
                    total,
                    source,
                })?;
        }

        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
