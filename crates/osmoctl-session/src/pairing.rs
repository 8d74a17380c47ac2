//! Pairing and WiFi-association choreography against the ground station.

use bytes::{Bytes, BytesMut};
use osmoctl_duml::{
    pack::{put_string, unpack_string_u16be},
    InterfaceId, Message, MessageId, MessageType,
};
use osmoctl_transport::Transport;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::device::Device;
use crate::error::{Result, SessionError};

/// PIN shown on the camera display during pairing.
pub const DEFAULT_PIN: &str = "5160";

/// Identifier this client presents in the pairing handshake.
const PAIRING_HOST_ID: &str = "001749319286102";

impl<T: Transport + 'static> Device<T> {
    /// Run the pairing handshake.
    ///
    /// Opens the pairing channel, announces the PIN, then waits for the
    /// device to confirm. A status whose second payload byte is `0x01`
    /// means the device already trusts us and the remaining stages are
    /// skipped; otherwise the user has to approve the PIN on the camera
    /// before the two final stage messages go out.
    pub fn pair(&self, cancel: &CancelToken) -> Result<()> {
        self.pair_with_pin(DEFAULT_PIN, cancel)
    }

    pub fn pair_with_pin(&self, pin: &str, cancel: &CancelToken) -> Result<()> {
        let status_sub = self.subscribe(MessageType::PAIRING_STATUS);
        let approved_sub = self.subscribe(MessageType::PAIRING_PIN_APPROVED);

        self.send_pairing_request(&[0x01, 0x00])?;
        self.send_message(&set_pairing_pin_message(pin))?;

        debug!("waiting for the pairing status");
        let status = status_sub.wait_cancellable(self.config().pairing_timeout, cancel)?;
        if status.payload.len() < 2 {
            warn!(len = status.payload.len(), "pairing status payload too short");
        } else if status.payload[1] == 0x01 {
            debug!("device is already paired");
            return Ok(());
        }

        debug!("waiting for PIN approval on the camera");
        let approved = approved_sub.wait_cancellable(self.config().pairing_timeout, cancel)?;
        debug!(msg = %approved, "PIN was approved");

        self.send_message(&pairing_stage1_message())?;
        self.send_message(&pairing_stage2_message())?;
        Ok(())
    }

    /// Ask the device to join a WiFi network.
    ///
    /// The response payload must be exactly the two-byte success marker
    /// `{0, 0}`.
    pub fn connect_to_wifi(&self, ssid: &str, psk: &str) -> Result<()> {
        let resp = self.request(&connect_to_wifi_message(ssid, psk))?;
        debug!(msg = %resp, "received wifi join report");
        if resp.payload.as_ref() != [0, 0] {
            return Err(SessionError::UnexpectedPayload {
                context: "connect_to_wifi",
                payload: resp.payload.to_vec(),
            });
        }
        Ok(())
    }

    /// Kick off a WiFi scan; the report arrives as a separate
    /// [`MessageType::WIFI_SCAN_REPORT`] notification.
    pub fn start_scanning_wifi(&self) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_WIFI_GROUND_STATION,
            MessageId::START_SCANNING_WIFI,
            MessageType::START_SCANNING_WIFI,
            Bytes::new(),
        ))
    }

    /// Read the SSID and PSK of the camera's own access point.
    ///
    /// The device answers with two independent notifications in either
    /// order, each carrying one length-prefixed string.
    pub fn camera_ap_info(&self, cancel: &CancelToken) -> Result<(String, String)> {
        let ssid_sub = self.subscribe(MessageType::CAMERA_AP_INFO_SSID);
        let psk_sub = self.subscribe(MessageType::CAMERA_AP_INFO_PSK);

        self.send_message(&Message::new(
            InterfaceId::APP_TO_WIFI_GROUND_STATION,
            MessageId::CAMERA_AP_INFO,
            MessageType::CAMERA_AP_INFO,
            Bytes::from_static(&[0x20]),
        ))?;

        let timeout = self.config().request_timeout;
        let ssid_msg = ssid_sub.wait_cancellable(timeout, cancel)?;
        let psk_msg = psk_sub.wait_cancellable(timeout, cancel)?;
        let ssid = unpack_string_u16be(&ssid_msg.payload)?;
        let psk = unpack_string_u16be(&psk_msg.payload)?;
        Ok((ssid, psk))
    }
}

fn set_pairing_pin_message(pin: &str) -> Message {
    let mut payload = BytesMut::new();
    put_string(&mut payload, PAIRING_HOST_ID);
    put_string(&mut payload, pin);
    Message::new(
        InterfaceId::APP_TO_WIFI_GROUND_STATION,
        MessageId::SET_PAIRING_PIN,
        MessageType::SET_PAIRING_PIN,
        payload.freeze(),
    )
}

fn pairing_stage1_message() -> Message {
    Message::new(
        InterfaceId::APP_TO_WIFI_GROUND_STATION,
        MessageId::PAIRING_STAGE1,
        MessageType::PAIRING_STAGE1,
        Bytes::from_static(&[0x00]),
    )
}

fn pairing_stage2_message() -> Message {
    Message::new(
        InterfaceId::APP_TO_PAIRER,
        MessageId::PAIRING_STAGE2,
        MessageType::PAIRING_STAGE2,
        Bytes::from_static(&[0x31, 0x31, 0x00, 0x00, 0x00]),
    )
}

fn connect_to_wifi_message(ssid: &str, psk: &str) -> Message {
    let mut payload = BytesMut::new();
    put_string(&mut payload, ssid);
    put_string(&mut payload, psk);
    Message::new(
        InterfaceId::APP_TO_WIFI_GROUND_STATION,
        MessageId::CONNECT_TO_WIFI,
        MessageType::CONNECT_TO_WIFI,
        payload.freeze(),
    )
}
