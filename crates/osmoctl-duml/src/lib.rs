//! DUML wire protocol: framing, checksums and message taxonomy.
//!
//! Every frame starts with a 0x55 magic byte and carries:
//! - A 10-bit total length and a 6-bit protocol version
//! - A CRC8 over the first three header bytes
//! - Sender and receiver component IDs and a 16-bit message ID
//! - A 3-byte message type (flags, command set, command ID)
//! - The payload, then a CRC16 over everything preceding it
//!
//! The [`wifi`] module adds the outer UDP wrapper spoken on the WiFi
//! control port.

pub mod battery;
pub mod codec;
pub mod command;
pub mod crc;
pub mod device_type;
pub mod error;
pub mod interface;
pub mod pack;
pub mod params;
pub mod simulator;
pub mod wifi;

pub use battery::BatteryStatus;
pub use codec::{
    decode_message, encode_message, Message, HEADER_SIZE, MAGIC, MAX_PAYLOAD, MAX_TOTAL_LENGTH,
    OVERHEAD, PROTOCOL_VERSION,
};
pub use command::{cmd_set, MessageId, MessageType, FLAG_ACK_REQUIRED, FLAG_RESPONSE};
pub use crc::{crc16, crc8};
pub use device_type::{DeviceType, MANUFACTURER_PREFIX};
pub use error::{Result, WireError};
pub use interface::{ComponentId, InterfaceId};
pub use pack::{put_string, put_url, unpack_string_u16be};
pub use params::{BroadcastConfig, BroadcastPlatform, Fps, GogglesMode, ImageStabilization, Resolution};
pub use simulator::{SimulatorData, STICK_CENTER, STICK_MAX, STICK_MIN};
pub use wifi::{parse_packet, StatusReport, StreamCapability, WrapperPacket, WIFI_CONTROL_PORT};
