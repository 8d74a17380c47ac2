//! Outer UDP wrapper spoken on the WiFi control port (9004).
//!
//! Every datagram carries a 20-byte header followed by an opaque payload,
//! which for control traffic is usually a DUML frame:
//! ```text
//! ┌───────────────┬──────────────┬───────────┬────────────────┬──────────┐
//! │ len lo (1B)   │ kind|len hi  │ signature │ metadata (16B) │ payload  │
//! │               │ (1B)         │ 0x47 0xA8 │ byte 6 = wh    │ …        │
//! └───────────────┴──────────────┴───────────┴────────────────┴──────────┘
//! ```
//! The length is 12 bits little-endian across bytes 0 and 1; the high
//! nibble of byte 1 is the packet kind.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{decode_message, encode_message, Message, MAGIC};
use crate::error::{Result, WireError};

/// Size of the wrapper header.
pub const WRAPPER_HEADER_SIZE: usize = 20;

/// Signature bytes at offsets 2 and 3.
pub const WRAPPER_SIGNATURE: [u8; 2] = [0x47, 0xA8];

/// Size of the opaque metadata block.
pub const METADATA_SIZE: usize = 16;

/// Default UDP control port.
pub const WIFI_CONTROL_PORT: u16 = 9004;

/// Packet kind: periodic status and media traffic.
pub const KIND_STANDARD: u8 = 0x80;
/// Packet kind: app-originated control traffic.
pub const KIND_CONTROL: u8 = 0x30;

/// Sub-protocol multiplexer values carried at byte 6.
pub const WH_HANDSHAKE: u8 = 0x00;
pub const WH_DRONE_CMD1: u8 = 0x01;
pub const WH_VIDEO: u8 = 0x02;
pub const WH_DRONE_CMD2: u8 = 0x03;
pub const WH_OPERATOR_CMD1: u8 = 0x04;
pub const WH_OPERATOR_CMD2: u8 = 0x05;
pub const WH_OPERATOR_CMD3: u8 = 0x06;

pub fn kind_name(kind: u8) -> &'static str {
    match kind {
        KIND_STANDARD => "standard",
        KIND_CONTROL => "control",
        _ => "unknown",
    }
}

pub fn wh_type_name(wh: u8) -> &'static str {
    match wh {
        WH_HANDSHAKE => "handshake",
        WH_DRONE_CMD1 => "drone_cmd1",
        WH_VIDEO => "video",
        WH_DRONE_CMD2 => "drone_cmd2",
        WH_OPERATOR_CMD1 => "operator_cmd1",
        WH_OPERATOR_CMD2 => "operator_cmd2",
        WH_OPERATOR_CMD3 => "operator_cmd3",
        _ => "unknown",
    }
}

/// Metadata block seen in the device's initial status packet.
pub const METADATA_INITIAL: [u8; METADATA_SIZE] = [
    0x00, 0x00, 0x00, 0x5F, 0x38, 0x42, 0x64, 0x00, 0x64, 0x00, 0xC0, 0x05, 0x14, 0x00, 0x00,
    0x64,
];

/// Metadata block used for app-originated DUML commands.
pub const METADATA_APP: [u8; METADATA_SIZE] = [
    0x40, 0x42, 0x05, 0x47, 0x38, 0x42, 0x40, 0x42, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00,
    0x00,
];

/// Status-report payload mirrored back at the device during the handshake.
pub const PAYLOAD_INITIAL: [u8; 28] = [
    0x00, 0x00, 0x01, 0x90, 0x01, 0xC0, 0x05, 0x14, 0x00, 0x00, 0x64, 0x00, 0x14, 0x00, 0x64,
    0x00, 0xC0, 0x05, 0x14, 0x00, 0x00, 0x64, 0x00, 0x01, 0x01, 0x04, 0x01, 0x02,
];

/// DUML payload of the "sAPP" app-identification command.
pub const PAYLOAD_APP_IDENTIFIER: [u8; 11] = [
    0x73, 0x41, 0x50, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x10,
];

/// "RMVT" magic that triggers video streaming.
pub const PAYLOAD_HANDSHAKE_RMVT: [u8; 16] = [
    0x52, 0x4D, 0x56, 0x54, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00,
];

/// One wrapper packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperPacket {
    pub kind: u8,
    pub wh_type: u8,
    pub metadata: [u8; METADATA_SIZE],
    pub payload: Bytes,
}

impl WrapperPacket {
    /// A control packet carrying an encoded DUML message.
    pub fn duml(msg: &Message, metadata: [u8; METADATA_SIZE]) -> Self {
        Self {
            kind: KIND_CONTROL,
            wh_type: metadata[2],
            metadata,
            payload: encode_message(msg),
        }
    }

    /// A control packet with a raw payload.
    pub fn control(metadata: [u8; METADATA_SIZE], payload: impl Into<Bytes>) -> Self {
        Self {
            kind: KIND_CONTROL,
            wh_type: metadata[2],
            metadata,
            payload: payload.into(),
        }
    }

    /// The handshake packet that requests video streaming.
    pub fn video_handshake() -> Self {
        Self {
            kind: 0,
            wh_type: WH_HANDSHAKE,
            metadata: [0; METADATA_SIZE],
            payload: Bytes::from_static(&PAYLOAD_HANDSHAKE_RMVT),
        }
    }

    /// Decode the payload as a DUML message.
    pub fn duml_message(&self) -> Result<Message> {
        if self.payload.first() != Some(&MAGIC) {
            return Err(WireError::InvalidMagic {
                found: self.payload.first().copied().unwrap_or(0),
            });
        }
        decode_message(&self.payload)
    }

    /// Serialize to wire bytes; the 12-bit length is recomputed from the
    /// actual payload size and the wh-type overwrites metadata byte 2.
    pub fn encode(&self) -> Bytes {
        let total = WRAPPER_HEADER_SIZE + self.payload.len();
        let mut buf = BytesMut::with_capacity(total);
        buf.put_u8((total & 0xFF) as u8);
        buf.put_u8((self.kind & 0xF0) | ((total >> 8) as u8 & 0x0F));
        buf.put_slice(&WRAPPER_SIGNATURE);
        buf.put_slice(&self.metadata);
        buf[4 + 2] = self.wh_type;
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// Parse one datagram.
///
/// Some firmware revisions send bare DUML frames on the control port; a
/// buffer starting with the DUML magic that parses as a frame is returned
/// as a control packet carrying it.
pub fn parse_packet(b: &[u8]) -> Result<WrapperPacket> {
    if b.is_empty() {
        return Err(WireError::WrapperTooShort {
            needed: WRAPPER_HEADER_SIZE,
            got: 0,
        });
    }

    if b[0] == MAGIC && decode_message(b).is_ok() {
        return Ok(WrapperPacket {
            kind: KIND_CONTROL,
            wh_type: WH_HANDSHAKE,
            metadata: [0; METADATA_SIZE],
            payload: Bytes::copy_from_slice(b),
        });
    }

    if b.len() < WRAPPER_HEADER_SIZE {
        return Err(WireError::WrapperTooShort {
            needed: WRAPPER_HEADER_SIZE,
            got: b.len(),
        });
    }

    if b[2..4] != WRAPPER_SIGNATURE {
        return Err(WireError::InvalidWrapperSignature {
            found: u16::from_be_bytes([b[2], b[3]]),
        });
    }

    let mut metadata = [0u8; METADATA_SIZE];
    metadata.copy_from_slice(&b[4..WRAPPER_HEADER_SIZE]);

    Ok(WrapperPacket {
        kind: b[1] & 0xF0,
        wh_type: b[6],
        metadata,
        payload: Bytes::copy_from_slice(&b[WRAPPER_HEADER_SIZE..]),
    })
}

/// One stream configuration announced in a status packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCapability {
    /// Maximum transmission unit, commonly 1472.
    pub mtu: u16,
    /// Frame or packet interval in milliseconds, commonly 20.
    pub frame_interval: u16,
    /// Quality setting from 1 to 100.
    pub quality: u16,
}

/// Decoded status packet: product info, stream capabilities, tail byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub product_info: [u8; 6],
    pub streams: Vec<StreamCapability>,
    pub tail: u8,
}

impl StatusReport {
    /// Parse the payload of a standard status packet: 6 bytes of product
    /// info, 11-byte capability blocks, one trailing byte.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        const PRODUCT_INFO_SIZE: usize = 6;
        const CAPABILITY_SIZE: usize = 11;

        if payload.len() < PRODUCT_INFO_SIZE + 1 {
            return Err(WireError::PayloadTooShort {
                needed: PRODUCT_INFO_SIZE + 1,
                got: payload.len(),
            });
        }

        let mut product_info = [0u8; PRODUCT_INFO_SIZE];
        product_info.copy_from_slice(&payload[..PRODUCT_INFO_SIZE]);

        let stream_area = &payload[PRODUCT_INFO_SIZE..payload.len() - 1];
        if stream_area.len() % CAPABILITY_SIZE != 0 {
            return Err(WireError::InvalidStatusReport {
                length: stream_area.len(),
            });
        }

        let streams = stream_area
            .chunks_exact(CAPABILITY_SIZE)
            .map(|block| StreamCapability {
                mtu: u16::from_le_bytes([block[0], block[1]]),
                frame_interval: u16::from_le_bytes([block[2], block[3]]),
                quality: u16::from_le_bytes([block[4], block[5]]),
            })
            .collect();

        Ok(Self {
            product_info,
            streams,
            tail: payload[payload.len() - 1],
        })
    }
}
