use crate::error::Result;

/// Maximum payload of one radio packet accepted by the link.
pub const DEFAULT_MTU: usize = 20;

/// Outbound half of the radio link: sends one packet at a time.
///
/// A successful return means the packet was handed to the radio stack.
/// Delivery is assumed in-order and lossless; there is no acknowledgement.
pub trait PacketTransport {
    /// Send a single packet.
    fn send_packet(&mut self, packet: &[u8]) -> Result<()>;

    /// Largest packet the transport accepts without segmentation.
    fn mtu(&self) -> usize {
        DEFAULT_MTU
    }
}

/// Inbound half of the radio link: one text message per notification.
pub trait NotificationSource {
    /// Receive the next notification.
    ///
    /// Returns `Ok(None)` once the link has been closed by the peer.
    fn recv_notification(&mut self) -> Result<Option<String>>;
}

impl<T: PacketTransport + ?Sized> PacketTransport for &mut T {
    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        (**self).send_packet(packet)
    }

    fn mtu(&self) -> usize {
        (**self).mtu()
    }
}

impl<T: NotificationSource + ?Sized> NotificationSource for &mut T {
    fn recv_notification(&mut self) -> Result<Option<String>> {
        (**self).recv_notification()
    }
}

impl<T: PacketTransport + ?Sized> PacketTransport for Box<T> {
    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        (**self).send_packet(packet)
    }

    fn mtu(&self) -> usize {
        (**self).mtu()
    }
}

impl<T: NotificationSource + ?Sized> NotificationSource for Box<T> {
    fn recv_notification(&mut self) -> Result<Option<String>> {
        (**self).recv_notification()
    }
}
