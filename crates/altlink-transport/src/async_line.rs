use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::DEFAULT_MTU;

/// Async outbound half of the radio link.
///
/// Same contract as [`crate::PacketTransport`]: one packet per call,
/// resolved once the radio stack accepted it or failed.
#[allow(async_fn_in_trait)]
pub trait AsyncPacketTransport {
    async fn send_packet(&mut self, packet: &[u8]) -> Result<()>;

    fn mtu(&self) -> usize {
        DEFAULT_MTU
    }
}

/// Writes each packet as one newline-terminated line on an `AsyncWrite`.
pub struct AsyncLineSink<W> {
    inner: W,
    mtu: usize,
}

impl<W: AsyncWrite + Unpin> AsyncLineSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            mtu: DEFAULT_MTU,
        }
    }

    pub fn with_mtu(inner: W, mtu: usize) -> Self {
        Self { inner, mtu }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> AsyncPacketTransport for AsyncLineSink<W> {
    async fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        let mut line = Vec::with_capacity(packet.len() + 1);
        line.extend_from_slice(packet);
        line.push(b'\n');
        trace!(len = packet.len(), "writing packet line");

        self.inner.write_all(&line).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::WriteZero {
                TransportError::Closed
            } else {
                TransportError::Io(err)
            }
        })?;
        self.inner.flush().await?;
        Ok(())
    }

    fn mtu(&self) -> usize {
        self.mtu
    }
}
