use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{MessageId, MessageType};
use crate::crc::{crc16, crc8};
use crate::error::{Result, WireError};
use crate::interface::{ComponentId, InterfaceId};

/// First byte of every frame.
pub const MAGIC: u8 = 0x55;

/// Version bits carried in the upper six bits of byte 2.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Bytes before the payload: magic, length/version, CRC8, interface,
/// message ID, type.
pub const HEADER_SIZE: usize = 11;

/// Header plus the trailing CRC16.
pub const OVERHEAD: usize = HEADER_SIZE + 2;

/// The total length field is 10 bits wide.
pub const MAX_TOTAL_LENGTH: usize = 0x3FF;

/// Largest payload that fits the 10-bit total length.
pub const MAX_PAYLOAD: usize = MAX_TOTAL_LENGTH - OVERHEAD;

/// A single DUML message.
///
/// Wire format (total length is 10 bits split across bytes 1 and 2):
/// ```text
/// ┌───────┬────────┬─────────────┬──────┬────────┬────────┬──────────┬─────────┬──────────┐
/// │ 0x55  │ len lo │ ver<<2|lenH │ CRC8 │ sender │ recv   │ ID (BE)  │ type    │ payload  │
/// │ 1B    │ 1B     │ 1B          │ 1B   │ 1B     │ 1B     │ 2B       │ 3B      │ …        │
/// └───────┴────────┴─────────────┴──────┴────────┴────────┴──────────┴─────────┴──────────┘
///                                                                       CRC16 (LE), 2B ──┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub interface: InterfaceId,
    pub id: MessageId,
    pub msg_type: MessageType,
    pub payload: Bytes,
}

impl Message {
    pub fn new(
        interface: InterfaceId,
        id: MessageId,
        msg_type: MessageType,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            interface,
            id,
            msg_type,
            payload: payload.into(),
        }
    }

    /// Total size of the encoded frame.
    pub fn wire_size(&self) -> usize {
        OVERHEAD + self.payload.len()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} id={} type={} payload=",
            self.interface, self.id, self.msg_type
        )?;
        for b in self.payload.iter() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Encode a message into its wire form.
///
/// Panics if the payload exceeds [`MAX_PAYLOAD`]; oversized payloads are a
/// programmer error, not a runtime condition.
pub fn encode_message(msg: &Message) -> Bytes {
    assert!(
        msg.payload.len() <= MAX_PAYLOAD,
        "payload length {} exceeds the maximum of {}",
        msg.payload.len(),
        MAX_PAYLOAD
    );

    let total = msg.wire_size();
    let mut buf = BytesMut::with_capacity(total);
    buf.put_u8(MAGIC);
    buf.put_u8((total & 0xFF) as u8);
    buf.put_u8((PROTOCOL_VERSION << 2) | ((total >> 8) as u8 & 0x03));
    let header_crc = crc8(&buf);
    buf.put_u8(header_crc);
    buf.put_u8(msg.interface.sender.0);
    buf.put_u8(msg.interface.receiver.0);
    buf.put_u16(msg.id.0);
    buf.put_u8(msg.msg_type.flags);
    buf.put_u8(msg.msg_type.cmd_set);
    buf.put_u8(msg.msg_type.cmd_id);
    buf.put_slice(&msg.payload);
    let frame_crc = crc16(&buf);
    buf.put_u16_le(frame_crc);
    buf.freeze()
}

/// Decode a message from the start of `src`.
///
/// Exactly the declared total length is consumed; trailing bytes beyond it
/// are ignored (BLE notifications pad frames to the characteristic size).
pub fn decode_message(src: &[u8]) -> Result<Message> {
    if src.len() < OVERHEAD {
        return Err(WireError::Truncated {
            needed: OVERHEAD,
            got: src.len(),
        });
    }
    if src[0] != MAGIC {
        return Err(WireError::InvalidMagic { found: src[0] });
    }

    let total = src[1] as usize | ((src[2] as usize & 0x03) << 8);
    if total < OVERHEAD {
        return Err(WireError::InvalidLength { length: total });
    }
    if src.len() < total {
        return Err(WireError::Truncated {
            needed: total,
            got: src.len(),
        });
    }

    let version = src[2] >> 2;
    if version != PROTOCOL_VERSION {
        return Err(WireError::UnsupportedVersion { found: version });
    }

    let expected = crc8(&src[..3]);
    if src[3] != expected {
        return Err(WireError::HeaderCrcMismatch {
            found: src[3],
            expected,
        });
    }

    let frame = &src[..total];
    let expected = crc16(&frame[..total - 2]);
    let found = u16::from_le_bytes([frame[total - 2], frame[total - 1]]);
    if found != expected {
        return Err(WireError::BodyCrcMismatch { found, expected });
    }

    Ok(Message {
        interface: InterfaceId::new(ComponentId(frame[4]), ComponentId(frame[5])),
        id: MessageId(u16::from_be_bytes([frame[6], frame[7]])),
        msg_type: MessageType {
            flags: frame[8],
            cmd_set: frame[9],
            cmd_id: frame[10],
        },
        payload: Bytes::copy_from_slice(&frame[HEADER_SIZE..total - 2]),
    })
}
