use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};

/// A bidirectional byte pipe to a device.
///
/// Implementations carry whole protocol units per call: a UDP transport
/// maps one buffer to one datagram, a BLE transport maps it to one GATT
/// write. Methods take `&self` so a reader thread can block in
/// [`recv_timeout`] while another thread sends.
pub trait Transport: Send + Sync {
    /// Send one buffer to the device.
    fn send(&self, buf: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for the next inbound buffer.
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing received.
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Bytes>>;

    /// Send a buffer on the dedicated pairing channel.
    ///
    /// Only BLE exposes a separate pairing characteristic; other
    /// transports reject this.
    fn send_pairing_request(&self, _buf: &[u8]) -> Result<()> {
        Err(TransportError::Unsupported("pairing channel"))
    }

    /// Shut the transport down; subsequent calls fail with
    /// [`TransportError::Closed`].
    fn close(&self) -> Result<()>;
}
