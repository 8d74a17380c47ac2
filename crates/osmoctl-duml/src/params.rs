//! Streaming and camera parameters with their wire encodings.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::pack::put_url;

/// Video resolution selector for live streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    P480,
    P720,
    P1080,
}

impl Resolution {
    pub const fn wire_byte(self) -> u8 {
        match self {
            Resolution::P480 => 0x47,
            Resolution::P720 => 0x04,
            Resolution::P1080 => 0x0A,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resolution::P480 => "480p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        })
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "480p" => Ok(Resolution::P480),
            "720p" => Ok(Resolution::P720),
            "1080p" => Ok(Resolution::P1080),
            other => Err(format!(
                "invalid resolution {other:?}, expected 480p, 720p or 1080p"
            )),
        }
    }
}

/// Frame rate selector for live streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fps {
    F24,
    F25,
    F30,
}

impl Fps {
    pub const fn wire_byte(self) -> u8 {
        match self {
            Fps::F24 => 0x01,
            Fps::F25 => 0x02,
            Fps::F30 => 0x03,
        }
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fps::F24 => "24",
            Fps::F25 => "25",
            Fps::F30 => "30",
        })
    }
}

impl TryFrom<u32> for Fps {
    type Error = String;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            24 => Ok(Fps::F24),
            25 => Ok(Fps::F25),
            30 => Ok(Fps::F30),
            other => Err(format!("invalid fps {other}, expected 24, 25 or 30")),
        }
    }
}

impl FromStr for Fps {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u32 = s.parse().map_err(|_| format!("invalid fps {s:?}"))?;
        Fps::try_from(v)
    }
}

/// Electronic image stabilization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStabilization {
    Off,
    RockSteady,
    HorizonSteady,
    RockSteadyPlus,
    HorizonBalancing,
}

impl ImageStabilization {
    pub const fn wire_byte(self) -> u8 {
        match self {
            ImageStabilization::Off => 0x00,
            ImageStabilization::RockSteady => 0x01,
            ImageStabilization::HorizonSteady => 0x02,
            ImageStabilization::RockSteadyPlus => 0x03,
            ImageStabilization::HorizonBalancing => 0x04,
        }
    }
}

impl fmt::Display for ImageStabilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageStabilization::Off => "off",
            ImageStabilization::RockSteady => "rocksteady",
            ImageStabilization::HorizonSteady => "horizonsteady",
            ImageStabilization::RockSteadyPlus => "rocksteady-plus",
            ImageStabilization::HorizonBalancing => "horizon-balancing",
        })
    }
}

impl FromStr for ImageStabilization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ImageStabilization::Off),
            "rocksteady" => Ok(ImageStabilization::RockSteady),
            "horizonsteady" => Ok(ImageStabilization::HorizonSteady),
            "rocksteady-plus" => Ok(ImageStabilization::RockSteadyPlus),
            "horizon-balancing" => Ok(ImageStabilization::HorizonBalancing),
            other => Err(format!("invalid image stabilization mode {other:?}")),
        }
    }
}

/// Goggles operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GogglesMode {
    Normal,
    Usb,
}

impl GogglesMode {
    pub const fn wire_byte(self) -> u8 {
        match self {
            GogglesMode::Normal => 0x00,
            GogglesMode::Usb => 0x01,
        }
    }
}

impl fmt::Display for GogglesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GogglesMode::Normal => "normal",
            GogglesMode::Usb => "usb",
        })
    }
}

impl FromStr for GogglesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(GogglesMode::Normal),
            "usb" => Ok(GogglesMode::Usb),
            other => Err(format!("invalid goggles mode {other:?}, expected usb or normal")),
        }
    }
}

/// Broadcast target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastPlatform {
    Rtmp,
}

impl BroadcastPlatform {
    pub const fn wire_byte(self) -> u8 {
        match self {
            BroadcastPlatform::Rtmp => 0x02,
        }
    }
}

/// Broadcast configuration payload: enabled flag, platform, target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastConfig {
    pub enabled: bool,
    pub platform: BroadcastPlatform,
    pub url: String,
}

impl BroadcastConfig {
    pub fn rtmp(url: impl Into<String>, enabled: bool) -> Self {
        Self {
            enabled,
            platform: BroadcastPlatform::Rtmp,
            url: url.into(),
        }
    }

    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(self.enabled as u8);
        buf.put_u8(self.platform.wire_byte());
        put_url(&mut buf, &self.url);
        buf.freeze()
    }
}
