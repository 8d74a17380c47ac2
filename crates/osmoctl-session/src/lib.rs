//! High-level device sessions on top of any byte transport.
//!
//! A [`Device`] owns a reader thread that demultiplexes the inbound
//! message stream through a [`Dispatcher`]; choreography methods compose
//! the send/request primitives into pairing, WiFi association and
//! live-stream setup. The [`wifi`] module adds the UDP control-port
//! handshake and the wrapper adapter.

pub mod cancel;
pub mod camera;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod pairing;
pub mod streaming;
pub mod wifi;

#[cfg(test)]
mod testing;

pub use cancel::CancelToken;
pub use device::{Device, DeviceConfig};
pub use dispatch::{Dispatcher, Subscription};
pub use error::{Result, SessionError};
pub use pairing::DEFAULT_PIN;
pub use streaming::LiveStreamConfig;
pub use wifi::{WifiController, WifiDumlTransport};
