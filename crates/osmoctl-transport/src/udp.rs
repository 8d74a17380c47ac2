use std::io::ErrorKind;
use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Largest datagram the device is known to send on the control port.
pub const RECV_BUFFER_SIZE: usize = 2048;

/// UDP transport to a device on the local WiFi network.
///
/// One send is one datagram; one receive is one datagram. The socket is
/// connected so stray traffic from other hosts is dropped by the kernel.
pub struct UdpTransport {
    socket: UdpSocket,
    closed: AtomicBool,
}

impl UdpTransport {
    /// Bind an ephemeral local port and connect to the device address.
    pub fn connect(addr: impl ToSocketAddrs + ToString) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        socket.connect(&addr).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(addr = %addr.to_string(), "connected udp transport");
        Ok(Self {
            socket,
            closed: AtomicBool::new(false),
        })
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

impl Transport for UdpTransport {
    fn send(&self, buf: &[u8]) -> Result<()> {
        self.check_open()?;
        self.socket.send(buf)?;
        trace!(len = buf.len(), "sent datagram");
        Ok(())
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Bytes>> {
        self.check_open()?;
        self.socket.set_read_timeout(Some(timeout))?;
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match self.socket.recv(&mut buf) {
            Ok(n) => {
                trace!(len = n, "received datagram");
                Ok(Some(Bytes::copy_from_slice(&buf[..n])))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        debug!("closed udp transport");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").unwrap()
    }

    #[test]
    fn test_send_and_recv() {
        let device = peer();
        let transport = UdpTransport::connect(device.local_addr().unwrap()).unwrap();

        transport.send(b"ping").unwrap();
        let mut buf = [0u8; 16];
        let (n, from) = device.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        device.send_to(b"pong", from).unwrap();
        let got = transport
            .recv_timeout(Duration::from_secs(1))
            .unwrap()
            .unwrap();
        assert_eq!(got.as_ref(), b"pong");
    }

    #[test]
    fn test_recv_timeout_returns_none() {
        let device = peer();
        let transport = UdpTransport::connect(device.local_addr().unwrap()).unwrap();
        let got = transport.recv_timeout(Duration::from_millis(20)).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_closed_transport_rejects_io() {
        let device = peer();
        let transport = UdpTransport::connect(device.local_addr().unwrap()).unwrap();
        transport.close().unwrap();
        assert!(matches!(
            transport.send(b"x"),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            transport.recv_timeout(Duration::from_millis(1)),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn test_pairing_channel_unsupported() {
        let device = peer();
        let transport = UdpTransport::connect(device.local_addr().unwrap()).unwrap();
        assert!(matches!(
            transport.send_pairing_request(b"x"),
            Err(TransportError::Unsupported(_))
        ));
    }
}
