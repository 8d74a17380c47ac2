//! WiFi control-port plumbing: the handshake that wakes the device up and
//! the adapter that lets a [`Device`] session run over the UDP wrapper.
//!
//! [`Device`]: crate::Device

use std::time::{Duration, Instant};

use bytes::Bytes;
use osmoctl_duml::wifi::{
    parse_packet, WrapperPacket, METADATA_APP, METADATA_INITIAL, PAYLOAD_APP_IDENTIFIER,
    PAYLOAD_INITIAL,
};
use osmoctl_duml::{
    encode_message, InterfaceId, Message, MessageId, MessageType, SimulatorData, MAGIC,
};
use osmoctl_transport::{Transport, UdpTransport};
use tracing::{debug, trace};

use crate::error::Result;

/// Thin command surface over the device's UDP control port.
///
/// All sends are fire-and-forget control packets; inbound traffic is read
/// with [`recv_packet`] and classified by the caller.
///
/// [`recv_packet`]: WifiController::recv_packet
pub struct WifiController<T: Transport> {
    transport: T,
}

impl WifiController<UdpTransport> {
    /// Dial the device's control port.
    pub fn connect(addr: impl std::net::ToSocketAddrs + ToString) -> Result<Self> {
        Ok(Self::new(UdpTransport::connect(addr)?))
    }
}

impl<T: Transport> WifiController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn send_packet(&self, packet: &WrapperPacket) -> Result<()> {
        trace!(kind = packet.kind, len = packet.payload.len(), "sending packet");
        self.transport.send(&packet.encode())?;
        Ok(())
    }

    /// Wait for the next parseable packet; `None` on timeout.
    pub fn recv_packet(&self, timeout: Duration) -> Result<Option<WrapperPacket>> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            match self.transport.recv_timeout(deadline - now)? {
                Some(buf) => match parse_packet(&buf) {
                    Ok(packet) => return Ok(Some(packet)),
                    Err(e) => debug!(error = %e, len = buf.len(), "skipping unparseable packet"),
                },
                None => return Ok(None),
            }
        }
    }

    /// Wrap a DUML message in a control packet and send it.
    pub fn send_duml(&self, msg: &Message, metadata: [u8; 16]) -> Result<()> {
        self.send_packet(&WrapperPacket::duml(msg, metadata))
    }

    /// Announce ourselves: mirror the device's status packet, then send
    /// the app-identification command.
    pub fn send_handshake(&self) -> Result<()> {
        self.send_packet(&WrapperPacket::control(
            METADATA_INITIAL,
            Bytes::from_static(&PAYLOAD_INITIAL),
        ))?;
        self.send_duml(
            &Message::new(
                InterfaceId::APP_TO_APP,
                MessageId::APP_IDENTIFIER,
                MessageType::notification(0x00, 0x00),
                Bytes::from_static(&PAYLOAD_APP_IDENTIFIER),
            ),
            METADATA_APP,
        )
    }

    /// Send the RMVT magic that triggers video streaming.
    pub fn send_video_handshake(&self) -> Result<()> {
        self.send_packet(&WrapperPacket::video_handshake())
    }

    /// Tell the video transmission component to stop streaming.
    pub fn send_stop_streaming(&self) -> Result<()> {
        self.send_duml(
            &Message::new(
                InterfaceId::APP_TO_VIDEO_TRANSMISSION,
                MessageId::STOP_STREAMING,
                MessageType::START_STOP_STREAMING,
                Bytes::from_static(&[0x00]),
            ),
            METADATA_APP,
        )
    }

    /// Switch the radio into FCC mode, fire-and-forget.
    pub fn send_fcc_enabled(&self) -> Result<()> {
        self.send_duml(
            &Message::new(
                InterfaceId::APP_TO_CAMERA,
                MessageId::ZERO,
                MessageType::FCC_SUPPORT,
                Bytes::from_static(&[0x01]),
            ),
            METADATA_APP,
        )
    }

    /// Configure the RTMP broadcast target, fire-and-forget.
    pub fn send_configure_broadcast(&self, url: &str, enable: bool) -> Result<()> {
        self.send_duml(
            &Message::new(
                InterfaceId::APP_TO_CAMERA,
                MessageId::START_STREAMING,
                MessageType::BROADCAST_CONFIG,
                osmoctl_duml::BroadcastConfig::rtmp(url, enable).to_payload(),
            ),
            METADATA_APP,
        )
    }

    /// Push one frame of simulated stick and button input.
    pub fn send_simulator_data(&self, data: &SimulatorData) -> Result<()> {
        self.send_duml(
            &Message::new(
                InterfaceId::APP_TO_REMOTE_CONTROLLER,
                MessageId::ZERO,
                MessageType::REMOTE_CONTROLLER_SIMULATOR_DATA,
                data.to_payload(),
            ),
            METADATA_APP,
        )
    }

    pub fn close(&self) -> Result<()> {
        self.transport.close()?;
        Ok(())
    }
}

/// [`Transport`] adapter that speaks raw DUML to the session layer while
/// wrapping and unwrapping control packets on the wire.
///
/// Non-DUML traffic (status packets, video) is skipped on receive.
pub struct WifiDumlTransport<T: Transport> {
    controller: WifiController<T>,
}

impl WifiDumlTransport<UdpTransport> {
    pub fn connect(addr: impl std::net::ToSocketAddrs + ToString) -> Result<Self> {
        Ok(Self::new(WifiController::connect(addr)?))
    }
}

impl<T: Transport> WifiDumlTransport<T> {
    pub fn new(controller: WifiController<T>) -> Self {
        Self { controller }
    }

    /// Run the app handshake; call once before starting a session.
    pub fn handshake(&self) -> Result<()> {
        self.controller.send_handshake()
    }
}

impl<T: Transport> Transport for WifiDumlTransport<T> {
    fn send(&self, buf: &[u8]) -> osmoctl_transport::Result<()> {
        let packet = WrapperPacket::control(METADATA_APP, Bytes::copy_from_slice(buf));
        self.controller.transport.send(&packet.encode())
    }

    fn recv_timeout(&self, timeout: Duration) -> osmoctl_transport::Result<Option<Bytes>> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let buf = match self.controller.transport.recv_timeout(deadline - now)? {
                Some(buf) => buf,
                None => return Ok(None),
            };
            match parse_packet(&buf) {
                Ok(packet) if packet.payload.first() == Some(&MAGIC) => {
                    return Ok(Some(packet.payload));
                }
                Ok(packet) => {
                    trace!(kind = packet.kind, wh = packet.wh_type, "skipping non-duml packet");
                }
                Err(e) => debug!(error = %e, len = buf.len(), "skipping unparseable packet"),
            }
        }
    }

    fn close(&self) -> osmoctl_transport::Result<()> {
        self.controller.transport.close()
    }
}
