//! Byte transports to DUML devices.
//!
//! Provides a unified interface over the links a device can be reached on:
//! - UDP over WiFi (the device's control port)
//! - BLE GATT (external implementations plug in via [`Transport`])
//!
//! This is the lowest layer of osmoctl. Everything else builds on top of
//! the [`Transport`] trait provided here.

pub mod error;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use traits::Transport;
pub use udp::{UdpTransport, RECV_BUFFER_SIZE};
