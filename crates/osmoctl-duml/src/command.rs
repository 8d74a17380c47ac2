use std::fmt;

/// Set on requests that expect an acknowledgement from the device.
pub const FLAG_ACK_REQUIRED: u8 = 0x40;
/// Set on responses; a response carries the type of the request it answers
/// with this bit added.
pub const FLAG_RESPONSE: u8 = 0x80;

/// Command-set bytes grouping commands by functional domain.
pub mod cmd_set {
    pub const GENERAL: u8 = 0x00;
    pub const INFO: u8 = 0x01;
    pub const CAMERA: u8 = 0x02;
    pub const FLIGHT_CONTROLLER: u8 = 0x03;
    pub const GIMBAL: u8 = 0x04;
    pub const REMOTE_CONTROLLER: u8 = 0x06;
    pub const WIFI: u8 = 0x07;
    pub const CONFIG: u8 = 0x08;
    pub const VISION: u8 = 0x0A;
    pub const BATTERY: u8 = 0x0D;
}

/// The three raw type bytes of a frame: flags, command set, command ID.
///
/// Unknown combinations pass through encode/decode untouched; the named
/// constants below only add meaning on top.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageType {
    pub flags: u8,
    pub cmd_set: u8,
    pub cmd_id: u8,
}

impl MessageType {
    /// A fire-and-forget message (no flags).
    pub const fn notification(cmd_set: u8, cmd_id: u8) -> Self {
        Self {
            flags: 0,
            cmd_set,
            cmd_id,
        }
    }

    /// A request that expects an acknowledgement.
    pub const fn request(cmd_set: u8, cmd_id: u8) -> Self {
        Self {
            flags: FLAG_ACK_REQUIRED,
            cmd_set,
            cmd_id,
        }
    }

    /// A response to a request of the same command set and ID.
    pub const fn response(cmd_set: u8, cmd_id: u8) -> Self {
        Self {
            flags: FLAG_RESPONSE,
            cmd_set,
            cmd_id,
        }
    }

    pub const fn with_ack(self) -> Self {
        Self {
            flags: self.flags | FLAG_ACK_REQUIRED,
            ..self
        }
    }

    pub const fn with_response(self) -> Self {
        Self {
            flags: self.flags | FLAG_RESPONSE,
            ..self
        }
    }

    /// Interop with the packed `0xFFSSII` form (flags, set, ID).
    pub const fn from_u32(v: u32) -> Self {
        Self {
            flags: (v >> 16) as u8,
            cmd_set: (v >> 8) as u8,
            cmd_id: v as u8,
        }
    }

    pub const fn as_u32(self) -> u32 {
        ((self.flags as u32) << 16) | ((self.cmd_set as u32) << 8) | self.cmd_id as u32
    }

    pub const fn requires_ack(self) -> bool {
        self.flags & FLAG_ACK_REQUIRED != 0
    }

    pub const fn is_response(self) -> bool {
        self.flags & FLAG_RESPONSE != 0
    }

    /// The type the device answers this type with.
    pub const fn response_type(self) -> Self {
        self.with_response()
    }

    pub const GET_SERIAL_NUMBER: Self = Self::request(cmd_set::GENERAL, 0x0A);
    pub const PAIRING_STAGE2: Self = Self::request(cmd_set::GENERAL, 0x32);
    pub const FCC_SUPPORT: Self = Self::request(cmd_set::GENERAL, 0xDE);
    pub const GET_PRODUCT_ID: Self = Self::request(cmd_set::INFO, 0x0D);
    pub const GET_VERSION: Self = Self::request(cmd_set::INFO, 0x1E);
    pub const PAIRING_STARTED: Self = Self::notification(cmd_set::CAMERA, 0x80);
    pub const BROADCAST_CONFIG: Self = Self::request(cmd_set::CAMERA, 0x08);
    pub const VIDEO_STREAM_SUBSCRIBE: Self = Self::request(cmd_set::CAMERA, 0x3C);
    pub const VIDEO_STREAM_UNSUBSCRIBE: Self = Self::request(cmd_set::CAMERA, 0x3D);
    pub const START_STOP_STREAMING: Self = Self::request(cmd_set::CAMERA, 0x8E);
    pub const START_STOP_STREAMING_RESULT: Self = Self::response(cmd_set::CAMERA, 0x8E);
    pub const PREPARE_TO_LIVE_STREAM: Self = Self::request(cmd_set::CAMERA, 0xE1);
    pub const PREPARE_TO_LIVE_STREAM_RESULT: Self =
        Self::request(cmd_set::CAMERA, 0xE1).with_response();
    pub const FLIGHT_STICK_DATA: Self = Self::notification(cmd_set::FLIGHT_CONTROLLER, 0x02);
    pub const MOTOR_CONTROL: Self = Self::request(cmd_set::FLIGHT_CONTROLLER, 0x21);
    pub const GOGGLES_MODE: Self = Self::request(cmd_set::FLIGHT_CONTROLLER, 0x3D);
    pub const STATUS: Self = Self::notification(cmd_set::GIMBAL, 0x05);
    pub const KEEP_ALIVE: Self = Self::notification(cmd_set::GIMBAL, 0x27);
    pub const REMOTE_CONTROLLER_SIMULATOR_DATA: Self =
        Self::notification(cmd_set::REMOTE_CONTROLLER, 0x24);
    pub const CAMERA_AP_INFO: Self = Self::request(cmd_set::WIFI, 0x07);
    pub const CAMERA_AP_INFO_SSID: Self = Self::request(cmd_set::WIFI, 0x07).with_response();
    pub const CAMERA_AP_INFO_PSK: Self = Self::request(cmd_set::WIFI, 0x0E).with_response();
    pub const SET_PAIRING_PIN: Self = Self::request(cmd_set::WIFI, 0x45);
    pub const PAIRING_STATUS: Self = Self::request(cmd_set::WIFI, 0x45).with_response();
    pub const PAIRING_PIN_APPROVED: Self = Self::request(cmd_set::WIFI, 0x46);
    pub const PAIRING_STAGE1: Self = Self::request(cmd_set::WIFI, 0x46).with_response();
    pub const CONNECT_TO_WIFI: Self = Self::request(cmd_set::WIFI, 0x47);
    pub const CONNECT_TO_WIFI_RESULT: Self = Self::request(cmd_set::WIFI, 0x47).with_response();
    pub const START_SCANNING_WIFI: Self = Self::request(cmd_set::WIFI, 0xAB);
    pub const START_SCANNING_WIFI_RESULT: Self =
        Self::request(cmd_set::WIFI, 0xAB).with_response();
    pub const WIFI_SCAN_REPORT: Self = Self::request(cmd_set::WIFI, 0xAC);
    pub const CONFIGURE_STREAMING: Self = Self::request(cmd_set::CONFIG, 0x78);
    pub const BATTERY_STATUS: Self = Self::notification(cmd_set::BATTERY, 0x02);
    pub const GET_BATTERY_INFO: Self = Self::request(cmd_set::BATTERY, 0x03);

    /// Human-readable name for diagnostics, if the type is a known one.
    pub fn name(self) -> Option<&'static str> {
        Some(match self.as_u32() {
            0x40000A => "GetSerialNumber",
            0x400032 => "PairingStage2",
            0x4000DE => "FCCSupport",
            0x40010D => "GetProductId",
            0x40011E => "GetVersion",
            0x000280 => "PairingStarted",
            0x400208 => "BroadcastConfig",
            0x40023C => "VideoStreamSubscribe",
            0x40023D => "VideoStreamUnsubscribe",
            0x40028E => "StartStopStreaming",
            0x80028E => "StartStopStreamingResult",
            0x4002E1 => "PrepareToLiveStream",
            0xC002E1 => "PrepareToLiveStreamResult",
            0x000302 => "FlightStickData",
            0x400321 => "MotorControl",
            0x40033D => "GogglesMode",
            0x000405 => "Status",
            0x000427 => "KeepAlive",
            0x000624 => "RemoteControllerSimulatorData",
            0x400707 => "CameraApInfo",
            0xC00707 => "CameraApInfoSsid",
            0xC0070E => "CameraApInfoPsk",
            0x400745 => "SetPairingPin",
            0xC00745 => "PairingStatus",
            0x400746 => "PairingPinApproved",
            0xC00746 => "PairingStage1",
            0x400747 => "ConnectToWiFi",
            0xC00747 => "ConnectToWiFiResult",
            0x4007AB => "StartScanningWiFi",
            0xC007AB => "StartScanningWiFiResult",
            0x4007AC => "WiFiScanReport",
            0x400878 => "ConfigureStreaming",
            0x000D02 => "BatteryStatus",
            0x400D03 => "GetBatteryInfo",
            _ => return None,
        })
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:06X}", self.as_u32()),
        }
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "MessageType({name})"),
            None => write!(f, "MessageType(0x{:06X})", self.as_u32()),
        }
    }
}

/// Transaction ID carried big-endian in bytes 6 and 7 of a frame.
///
/// Responses echo the ID of the request they answer. The constants are the
/// IDs the vendor app uses for the corresponding transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u16);

impl MessageId {
    pub const ZERO: Self = Self(0);
    pub const APP_IDENTIFIER: Self = Self(0x0000);
    pub const PAIRING_STAGE1: Self = Self(0x0400);
    pub const SET_PAIRING_PIN: Self = Self(0x72AA);
    pub const PAIRING_STAGE2: Self = Self(0x74AA);
    pub const PAIRING_STARTED: Self = Self(0x7911);
    pub const START_SCANNING_WIFI: Self = Self(0x8EBB);
    pub const CONNECT_TO_WIFI: Self = Self(0x98BB);
    pub const CONFIGURE_STREAMING: Self = Self(0xB3BB);
    pub const START_STREAMING: Self = Self(0xB4BB);
    pub const STOP_STREAMING: Self = Self(0xB5BB);
    pub const CAMERA_AP_INFO: Self = Self(0xEA94);
    pub const PREPARE_TO_LIVE_STREAM_STAGE1: Self = Self(0xFEAB);
    pub const PREPARE_TO_LIVE_STREAM_STAGE2: Self = Self(0xFFAB);
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
