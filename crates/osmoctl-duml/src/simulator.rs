//! Remote-controller simulator payload (virtual stick and button input).

use bytes::{BufMut, Bytes, BytesMut};

/// Lowest raw stick value (full deflection one way).
pub const STICK_MIN: u16 = 364;
/// Raw stick value at rest.
pub const STICK_CENTER: u16 = 1024;
/// Highest raw stick value (full deflection the other way).
pub const STICK_MAX: u16 = 1684;

/// Payload length of a simulator-data message; the full frame is 51 bytes.
pub const SIMULATOR_PAYLOAD_LEN: usize = 38;

/// Stick positions and button mask for one simulator-data notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorData {
    pub right_stick_horizontal: u16,
    pub right_stick_vertical: u16,
    pub left_stick_vertical: u16,
    pub left_stick_horizontal: u16,
    pub pressed_buttons: u32,
}

impl Default for SimulatorData {
    fn default() -> Self {
        Self {
            right_stick_horizontal: STICK_CENTER,
            right_stick_vertical: STICK_CENTER,
            left_stick_vertical: STICK_CENTER,
            left_stick_horizontal: STICK_CENTER,
            pressed_buttons: 0,
        }
    }
}

impl SimulatorData {
    /// Serialize to the fixed 38-byte wire payload. Sticks are u16 LE in
    /// the order RH, RV, LV, LH; the button mask is u32 LE at offset 8;
    /// the remainder is zero.
    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(SIMULATOR_PAYLOAD_LEN);
        buf.put_u16_le(self.right_stick_horizontal);
        buf.put_u16_le(self.right_stick_vertical);
        buf.put_u16_le(self.left_stick_vertical);
        buf.put_u16_le(self.left_stick_horizontal);
        buf.put_u32_le(self.pressed_buttons);
        buf.put_bytes(0, SIMULATOR_PAYLOAD_LEN - buf.len());
        buf.freeze()
    }
}
