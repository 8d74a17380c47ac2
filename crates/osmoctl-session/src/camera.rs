//! Camera, battery, goggles and remote-controller operations.

use bytes::{BufMut, Bytes, BytesMut};
use osmoctl_duml::{
    BatteryStatus, GogglesMode, ImageStabilization, InterfaceId, Message, MessageId, MessageType,
    SimulatorData,
};
use osmoctl_transport::Transport;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::device::Device;
use crate::error::Result;

impl<T: Transport + 'static> Device<T> {
    /// Read the firmware version report.
    pub fn get_version(&self) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_CAMERA,
            MessageId::ZERO,
            MessageType::GET_VERSION,
            Bytes::new(),
        ))
    }

    /// Query the battery and wait for the status notification that
    /// follows the acknowledgement.
    pub fn get_battery_info(&self, cancel: &CancelToken) -> Result<BatteryStatus> {
        let status_sub = self.subscribe(MessageType::BATTERY_STATUS);
        let ack = self.request(&Message::new(
            InterfaceId::APP_TO_BATTERY,
            MessageId::ZERO,
            MessageType::GET_BATTERY_INFO,
            Bytes::new(),
        ))?;
        debug!(msg = %ack, "battery query acknowledged");

        let status = status_sub.wait_cancellable(self.config().request_timeout, cancel)?;
        Ok(BatteryStatus::parse(&status.payload)?)
    }

    /// Switch the electronic image stabilization mode.
    pub fn set_image_stabilization(&self, mode: ImageStabilization) -> Result<()> {
        let mut payload = BytesMut::new();
        payload.put_slice(&[0x01, 0x01]);
        payload.put_u8(self.device_type().image_stabilization_byte());
        payload.put_slice(&[0x00, 0x01]);
        payload.put_u8(mode.wire_byte());

        let resp = self.request(&Message::new(
            InterfaceId::APP_TO_CAMERA,
            MessageId::ZERO,
            MessageType::START_STOP_STREAMING,
            payload.freeze(),
        ))?;
        debug!(msg = %resp, "image stabilization result");
        Ok(())
    }

    /// Switch the radio into FCC mode.
    pub fn set_fcc_enabled(&self) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_CAMERA,
            MessageId::ZERO,
            MessageType::FCC_SUPPORT,
            Bytes::from_static(&[0x01]),
        ))
    }

    /// Switch goggles between normal and USB mode.
    pub fn set_goggles_mode(&self, mode: GogglesMode) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_GOGGLES,
            MessageId::ZERO,
            MessageType::GOGGLES_MODE,
            Bytes::copy_from_slice(&[mode.wire_byte()]),
        ))
    }

    /// Push one frame of simulated stick and button input, fire-and-forget.
    pub fn send_simulator_data(&self, data: &SimulatorData) -> Result<()> {
        self.send_message(&Message::new(
            InterfaceId::APP_TO_REMOTE_CONTROLLER,
            MessageId::ZERO,
            MessageType::REMOTE_CONTROLLER_SIMULATOR_DATA,
            data.to_payload(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceConfig;
    use crate::testing::MockTransport;
    use osmoctl_duml::{decode_message, encode_message, ComponentId, DeviceType};
    use std::time::Duration;

    fn init_device(transport: MockTransport, device_type: DeviceType) -> Device<MockTransport> {
        transport.push_inbound(encode_message(&Message::new(
            InterfaceId::new(ComponentId::GIMBAL, ComponentId::APP),
            MessageId(1),
            MessageType::STATUS,
            Bytes::from_static(&[0; 4]),
        )));
        let mut config = DeviceConfig::default();
        config.request_timeout = Duration::from_secs(2);
        let device = Device::with_config(transport, device_type, config);
        device.init(Duration::from_secs(1)).unwrap();
        device
    }

    #[test]
    fn get_battery_info_combines_ack_and_notification() {
        let transport = MockTransport::new();
        let device = init_device(transport.clone(), DeviceType::OsmoAction4);

        std::thread::scope(|s| {
            let querier = s.spawn(|| device.get_battery_info(&CancelToken::new()));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(encode_message(&Message::new(
                InterfaceId::APP_TO_BATTERY.reversed(),
                MessageId::ZERO,
                MessageType::GET_BATTERY_INFO.response_type(),
                Bytes::from_static(&[0x00]),
            )));
            let mut payload = [0u8; 24];
            payload[20] = 66;
            transport.push_inbound(encode_message(&Message::new(
                InterfaceId::new(ComponentId::BATTERY, ComponentId::APP),
                MessageId(5),
                MessageType::BATTERY_STATUS,
                Bytes::copy_from_slice(&payload),
            )));
            let status = querier.join().unwrap().unwrap();
            assert_eq!(status.capacity_percent, 66);
        });
    }

    #[test]
    fn image_stabilization_payload_carries_model_byte() {
        let transport = MockTransport::new();
        let sent = transport.sent_handle();
        let device = init_device(transport.clone(), DeviceType::OsmoAction5Pro);

        std::thread::scope(|s| {
            let setter =
                s.spawn(|| device.set_image_stabilization(ImageStabilization::RockSteady));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(encode_message(&Message::new(
                InterfaceId::APP_TO_CAMERA.reversed(),
                MessageId::ZERO,
                MessageType::START_STOP_STREAMING_RESULT,
                Bytes::from_static(&[0x00]),
            )));
            setter.join().unwrap().unwrap();
        });

        let msg = decode_message(&sent.lock().unwrap()[0]).unwrap();
        assert_eq!(
            msg.payload.as_ref(),
            &[0x01, 0x01, 0x1A, 0x00, 0x01, 0x01]
        );
    }

    #[test]
    fn goggles_mode_payload() {
        let transport = MockTransport::new();
        let sent = transport.sent_handle();
        let device = init_device(transport.clone(), DeviceType::Mavic3);

        std::thread::scope(|s| {
            let setter = s.spawn(|| device.set_goggles_mode(GogglesMode::Usb));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(encode_message(&Message::new(
                InterfaceId::APP_TO_GOGGLES.reversed(),
                MessageId::ZERO,
                MessageType::GOGGLES_MODE.response_type(),
                Bytes::from_static(&[0x00]),
            )));
            setter.join().unwrap().unwrap();
        });

        let msg = decode_message(&sent.lock().unwrap()[0]).unwrap();
        assert_eq!(msg.interface.receiver, ComponentId::GOGGLES);
        assert_eq!(msg.payload.as_ref(), &[0x01]);
    }

    #[test]
    fn simulator_data_is_fire_and_forget() {
        let transport = MockTransport::new();
        let sent = transport.sent_handle();
        let device = init_device(transport.clone(), DeviceType::MavicAir2S);

        device.send_simulator_data(&SimulatorData::default()).unwrap();

        let msg = decode_message(&sent.lock().unwrap()[0]).unwrap();
        assert_eq!(msg.interface.receiver, ComponentId::REMOTE_CONTROLLER);
        assert_eq!(msg.msg_type, MessageType::REMOTE_CONTROLLER_SIMULATOR_DATA);
        assert_eq!(msg.payload.len(), 38);
    }
}
