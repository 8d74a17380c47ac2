use std::fmt;

/// A component on the device bus (sender or receiver of a frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub u8);

impl ComponentId {
    pub const CAMERA: Self = Self(0x01);
    pub const APP: Self = Self(0x02);
    pub const GIMBAL: Self = Self(0x03);
    pub const FLIGHT_CONTROLLER: Self = Self(0x04);
    pub const WIFI_AIR: Self = Self(0x05);
    pub const REMOTE_CONTROLLER: Self = Self(0x06);
    pub const WIFI_GROUND_STATION: Self = Self(0x07);
    pub const VIDEO_TRANSMISSION: Self = Self(0x08);
    pub const BATTERY: Self = Self(0x09);
    pub const GIMBAL2: Self = Self(0x0E);
    pub const VISION: Self = Self(0x11);
    pub const GOGGLES: Self = Self(0x17);
    pub const PAIRER: Self = Self(0x88);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::CAMERA => "camera",
            Self::APP => "app",
            Self::GIMBAL => "gimbal",
            Self::FLIGHT_CONTROLLER => "flight_controller",
            Self::WIFI_AIR => "wifi_air",
            Self::REMOTE_CONTROLLER => "remote_controller",
            Self::WIFI_GROUND_STATION => "wifi_ground_station",
            Self::VIDEO_TRANSMISSION => "video_transmission",
            Self::BATTERY => "battery",
            Self::GIMBAL2 => "gimbal2",
            Self::VISION => "vision",
            Self::GOGGLES => "goggles",
            Self::PAIRER => "pairer",
            _ => return None,
        })
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:02X}", self.0),
        }
    }
}

/// Sender/receiver pair carried in bytes 4 and 5 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId {
    pub sender: ComponentId,
    pub receiver: ComponentId,
}

impl InterfaceId {
    pub const fn new(sender: ComponentId, receiver: ComponentId) -> Self {
        Self { sender, receiver }
    }

    pub const APP_TO_APP: Self = Self::new(ComponentId::APP, ComponentId::APP);
    pub const APP_TO_CAMERA: Self = Self::new(ComponentId::APP, ComponentId::CAMERA);
    pub const APP_TO_GIMBAL: Self = Self::new(ComponentId::APP, ComponentId::GIMBAL);
    pub const APP_TO_FLIGHT_CONTROLLER: Self =
        Self::new(ComponentId::APP, ComponentId::FLIGHT_CONTROLLER);
    pub const APP_TO_REMOTE_CONTROLLER: Self =
        Self::new(ComponentId::APP, ComponentId::REMOTE_CONTROLLER);
    pub const APP_TO_WIFI_GROUND_STATION: Self =
        Self::new(ComponentId::APP, ComponentId::WIFI_GROUND_STATION);
    pub const APP_TO_VIDEO_TRANSMISSION: Self =
        Self::new(ComponentId::APP, ComponentId::VIDEO_TRANSMISSION);
    pub const APP_TO_BATTERY: Self = Self::new(ComponentId::APP, ComponentId::BATTERY);
    pub const APP_TO_GOGGLES: Self = Self::new(ComponentId::APP, ComponentId::GOGGLES);
    pub const APP_TO_PAIRER: Self = Self::new(ComponentId::APP, ComponentId::PAIRER);
    pub const FLIGHT_CONTROLLER_TO_APP: Self =
        Self::new(ComponentId::FLIGHT_CONTROLLER, ComponentId::APP);

    /// The same pair with the direction flipped.
    pub const fn reversed(self) -> Self {
        Self::new(self.receiver, self.sender)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.sender, self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_display() {
        assert_eq!(ComponentId::CAMERA.to_string(), "camera");
        assert_eq!(ComponentId(0x1B).to_string(), "1B");
    }

    #[test]
    fn interface_display() {
        assert_eq!(
            InterfaceId::APP_TO_WIFI_GROUND_STATION.to_string(),
            "app->wifi_ground_station"
        );
    }

    #[test]
    fn interface_reversed() {
        assert_eq!(
            InterfaceId::APP_TO_CAMERA.reversed(),
            InterfaceId::new(ComponentId::CAMERA, ComponentId::APP)
        );
    }
}
