use std::fmt;

use crate::error::{Result, WireError};

/// Battery telemetry extracted from a BatteryStatus notification.
///
/// Two payload layouts exist in the wild: long reports carry the capacity
/// at byte 20, short ones at byte 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub capacity_percent: u8,
}

impl BatteryStatus {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < 13 {
            return Err(WireError::PayloadTooShort {
                needed: 13,
                got: payload.len(),
            });
        }
        let capacity_percent = if payload.len() >= 21 {
            payload[20]
        } else {
            payload[12]
        };
        Ok(Self { capacity_percent })
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.capacity_percent)
    }
}
