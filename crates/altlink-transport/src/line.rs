use std::io::{BufRead, BufReader, ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{NotificationSource, PacketTransport, DEFAULT_MTU};

const LINE_TERMINATOR: u8 = b'\n';

/// Writes each packet as one newline-terminated line on any `Write` stream.
///
/// This is how a serial bridge to the radio (USB dongle, rfcomm device,
/// test socket) receives packets: the bridge forwards every line as one
/// characteristic write.
pub struct LineSink<W> {
    inner: W,
    buf: BytesMut,
    mtu: usize,
}

impl<W: Write> LineSink<W> {
    /// Create a sink with the default 20-byte MTU.
    pub fn new(inner: W) -> Self {
        Self::with_mtu(inner, DEFAULT_MTU)
    }

    /// Create a sink reporting an explicit MTU.
    pub fn with_mtu(inner: W, mtu: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(mtu + 1),
            mtu,
        }
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the sink and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PacketTransport for LineSink<W> {
    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.buf.clear();
        self.buf.reserve(packet.len() + 1);
        self.buf.put_slice(packet);
        self.buf.put_u8(LINE_TERMINATOR);
        trace!(len = packet.len(), "writing packet line");
        self.write_buffered()
    }

    fn mtu(&self) -> usize {
        self.mtu
    }
}

/// Reads one notification per line from any `Read` stream.
pub struct LineSource<R> {
    inner: BufReader<R>,
    line: Vec<u8>,
}

impl<R: Read> LineSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            line: Vec::new(),
        }
    }

    /// Consume the source and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> NotificationSource for LineSource<R> {
    fn recv_notification(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            let read = match self.inner.read_until(LINE_TERMINATOR, &mut self.line) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                return Ok(None);
            }

            while matches!(self.line.last(), Some(b'\n' | b'\r')) {
                self.line.pop();
            }
            if self.line.is_empty() {
                continue;
            }

            let text = std::str::from_utf8(&self.line).map_err(|_| TransportError::InvalidText {
                len: self.line.len(),
            })?;
            return Ok(Some(text.to_owned()));
        }
    }
}
