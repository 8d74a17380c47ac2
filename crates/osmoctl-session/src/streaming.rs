//! Live-stream choreography against the video transmission component.

use bytes::{BufMut, Bytes, BytesMut};
use osmoctl_duml::{
    pack::put_url, BatteryStatus, BroadcastConfig, DeviceType, Fps, InterfaceId, Message,
    MessageId, MessageType, Resolution,
};
use osmoctl_transport::Transport;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::device::Device;
use crate::error::{Result, SessionError};

/// Everything needed to push the camera's feed to an RTMP endpoint.
#[derive(Debug, Clone)]
pub struct LiveStreamConfig {
    pub resolution: Resolution,
    pub bitrate_kbps: u16,
    pub fps: Fps,
    pub rtmp_url: String,
}

impl LiveStreamConfig {
    pub fn new(rtmp_url: impl Into<String>) -> Self {
        Self {
            resolution: Resolution::P1080,
            bitrate_kbps: 6000,
            fps: Fps::F30,
            rtmp_url: rtmp_url.into(),
        }
    }
}

impl<T: Transport + 'static> Device<T> {
    /// Two-stage warm-up the vendor app performs before streaming.
    ///
    /// Stage 1 must be answered with a single `0x00` byte; stage 2's
    /// result is awaited but not validated.
    pub fn prepare_to_live_stream(&self, cancel: &CancelToken) -> Result<()> {
        let result_sub = self.subscribe(MessageType::PREPARE_TO_LIVE_STREAM.response_type());
        self.send_message(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION,
            MessageId::PREPARE_TO_LIVE_STREAM_STAGE1,
            MessageType::PREPARE_TO_LIVE_STREAM,
            Bytes::from_static(&[0x1A]),
        ))?;

        debug!("waiting for the streaming status");
        let msg = result_sub.wait_cancellable(self.config().request_timeout, cancel)?;
        if msg.payload.as_ref() != [0x00] {
            return Err(SessionError::UnexpectedPayload {
                context: "prepare_to_live_stream",
                payload: msg.payload.to_vec(),
            });
        }

        let result_sub = self.subscribe(MessageType::START_STOP_STREAMING_RESULT);
        self.send_message(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION,
            MessageId::START_STREAMING,
            MessageType::START_STOP_STREAMING,
            Bytes::from_static(&[0x00, 0x01, 0x1C, 0x00]),
        ))?;
        let msg = result_sub.wait_cancellable(self.config().request_timeout, cancel)?;
        debug!(%msg, "received prepare stage 2 result");
        Ok(())
    }

    /// Configure and start the stream, then report battery status until
    /// cancelled.
    pub fn live_stream(
        &self,
        config: &LiveStreamConfig,
        cancel: &CancelToken,
        mut on_battery: impl FnMut(BatteryStatus),
    ) -> Result<()> {
        self.configure_live_stream(config)?;
        self.start_live_stream()?;
        info!(url = %config.rtmp_url, "live stream started");

        loop {
            let sub = self.subscribe(MessageType::BATTERY_STATUS);
            let msg = match sub.wait_cancellable(self.config().request_timeout, cancel) {
                Ok(msg) => msg,
                Err(SessionError::Timeout(_)) => continue,
                Err(SessionError::Cancelled) => return Ok(()),
                Err(e) => return Err(e),
            };
            match BatteryStatus::parse(&msg.payload) {
                Ok(status) => on_battery(status),
                Err(e) => debug!(error = %e, "unable to parse battery status"),
            }
        }
    }

    pub fn configure_live_stream(&self, config: &LiveStreamConfig) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION,
            MessageId::CONFIGURE_STREAMING,
            MessageType::CONFIGURE_STREAMING,
            configure_payload(self.device_type(), config),
        ))
    }

    pub fn start_live_stream(&self) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION,
            MessageId::START_STREAMING,
            MessageType::START_STOP_STREAMING,
            Bytes::from_static(&[0x01, 0x01, 0x1A, 0x00, 0x01, 0x01]),
        ))
    }

    /// Stop a running stream; the response is awaited but not validated.
    pub fn stop_live_stream(&self) -> Result<()> {
        self.request(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION,
            MessageId::STOP_STREAMING,
            MessageType::START_STOP_STREAMING,
            Bytes::from_static(&[0x01, 0x01, 0x1A, 0x00, 0x01, 0x02]),
        ))?;
        Ok(())
    }

    /// Enable or disable the camera's built-in RTMP broadcast target.
    pub fn configure_rtmp_broadcast(&self, url: &str, enable: bool) -> Result<Message> {
        self.request(&Message::new(
            InterfaceId::APP_TO_CAMERA,
            MessageId::START_STREAMING,
            MessageType::BROADCAST_CONFIG,
            BroadcastConfig::rtmp(url, enable).to_payload(),
        ))
    }
}

// Reference capture:
//   hdr: 55 42 04 b0 0208 b3bb 400878
//   payload: 00 32 00 0a 7017 0200 03 000000 2700 72746d70...
fn configure_payload(device_type: DeviceType, config: &LiveStreamConfig) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(0x00);
    buf.put_u8(device_type.start_streaming_byte());
    buf.put_u8(0x00);
    buf.put_u8(config.resolution.wire_byte());
    buf.put_u16_le(config.bitrate_kbps);
    buf.put_slice(&[0x02, 0x00]);
    buf.put_u8(config.fps.wire_byte());
    buf.put_slice(&[0x00, 0x00, 0x00]);
    put_url(&mut buf, &config.rtmp_url);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceConfig;
    use crate::testing::MockTransport;
    use osmoctl_duml::{decode_message, encode_message, ComponentId};
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

    fn reply(msg_type: MessageType, id: MessageId, payload: &'static [u8]) -> Bytes {
        encode_message(&Message::new(
            InterfaceId::APP_TO_VIDEO_TRANSMISSION.reversed(),
            id,
            msg_type,
            Bytes::from_static(payload),
        ))
    }

    #[test]
    fn configure_payload_matches_reference_capture() {
        let config = LiveStreamConfig {
            resolution: Resolution::P1080,
            bitrate_kbps: 6000,
            fps: Fps::F30,
            rtmp_url: "x".into(),
        };
        // Capture shows device byte 0x32; the known models use 0x2A/0x2E,
        // so only the surrounding fixed bytes are pinned here.
        let payload = configure_payload(DeviceType::OsmoAction4, &config);
        assert_eq!(payload[0], 0x00);
        assert_eq!(payload[1], 0x2A);
        assert_eq!(payload[2], 0x00);
        assert_eq!(payload[3], 0x0A);
        assert_eq!(u16::from_le_bytes([payload[4], payload[5]]), 6000);
        assert_eq!(&payload[6..8], &[0x02, 0x00]);
        assert_eq!(payload[8], 0x03);
        assert_eq!(&payload[9..12], &[0x00, 0x00, 0x00]);
        assert_eq!(&payload[12..14], &[1, 0]);
        assert_eq!(&payload[14..], b"x");
    }

    #[test]
    fn action5_pro_uses_its_own_device_byte() {
        let config = LiveStreamConfig::new("rtmp://h/a");
        let payload = configure_payload(DeviceType::OsmoAction5Pro, &config);
        assert_eq!(payload[1], 0x2E);
    }

    #[test]
    fn prepare_rejects_nonzero_stage1_result() {
        let transport = MockTransport::new();
        let device = init_device(transport.clone(), DeviceType::OsmoAction4);

        std::thread::scope(|s| {
            let preparer = s.spawn(|| device.prepare_to_live_stream(&CancelToken::new()));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::PREPARE_TO_LIVE_STREAM_RESULT,
                MessageId::PREPARE_TO_LIVE_STREAM_STAGE1,
                &[0x01],
            ));
            assert!(matches!(
                preparer.join().unwrap(),
                Err(SessionError::UnexpectedPayload {
                    context: "prepare_to_live_stream",
                    ..
                })
            ));
        });
    }

    #[test]
    fn prepare_accepts_zero_and_runs_stage2() {
        let transport = MockTransport::new();
        let sent = transport.sent_handle();
        let device = init_device(transport.clone(), DeviceType::OsmoAction4);

        std::thread::scope(|s| {
            let preparer = s.spawn(|| device.prepare_to_live_stream(&CancelToken::new()));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::PREPARE_TO_LIVE_STREAM_RESULT,
                MessageId::PREPARE_TO_LIVE_STREAM_STAGE1,
                &[0x00],
            ));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::START_STOP_STREAMING_RESULT,
                MessageId::START_STREAMING,
                &[0x00],
            ));
            preparer.join().unwrap().unwrap();
        });

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let stage1 = decode_message(&sent[0]).unwrap();
        assert_eq!(stage1.payload.as_ref(), &[0x1A]);
        let stage2 = decode_message(&sent[1]).unwrap();
        assert_eq!(stage2.payload.as_ref(), &[0x00, 0x01, 0x1C, 0x00]);
    }

    #[test]
    fn stop_sends_fixed_payload() {
        let transport = MockTransport::new();
        let sent = transport.sent_handle();
        let device = init_device(transport.clone(), DeviceType::OsmoAction4);

        std::thread::scope(|s| {
            let stopper = s.spawn(|| device.stop_live_stream());
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::START_STOP_STREAMING_RESULT,
                MessageId::STOP_STREAMING,
                &[0x00],
            ));
            stopper.join().unwrap().unwrap();
        });

        let msg = decode_message(&sent.lock().unwrap()[0]).unwrap();
        assert_eq!(msg.id, MessageId::STOP_STREAMING);
        assert_eq!(msg.payload.as_ref(), &[0x01, 0x01, 0x1A, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn live_stream_reports_battery_until_cancelled() {
        let transport = MockTransport::new();
        let device = init_device(transport.clone(), DeviceType::OsmoAction4);
        let cancel = CancelToken::new();
        let config = LiveStreamConfig::new("rtmp://host/live");

        std::thread::scope(|s| {
            let seen = s.spawn(|| {
                let mut seen = Vec::new();
                device
                    .live_stream(&config, &cancel, |status| {
                        seen.push(status.capacity_percent)
                    })
                    .map(|_| seen)
            });

            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::CONFIGURE_STREAMING.response_type(),
                MessageId::CONFIGURE_STREAMING,
                &[0x00],
            ));
            std::thread::sleep(Duration::from_millis(50));
            transport.push_inbound(reply(
                MessageType::START_STOP_STREAMING_RESULT,
                MessageId::START_STREAMING,
                &[0x00],
            ));

            std::thread::sleep(Duration::from_millis(50));
            let mut battery = [0u8; 13];
            battery[12] = 77;
            transport.push_inbound(encode_message(&Message::new(
                InterfaceId::new(ComponentId::BATTERY, ComponentId::APP),
                MessageId(9),
                MessageType::BATTERY_STATUS,
                Bytes::copy_from_slice(&battery),
            )));

            std::thread::sleep(Duration::from_millis(100));
            cancel.cancel();
            let seen = seen.join().unwrap().unwrap();
            assert_eq!(seen, vec![77]);
        });
    }
}
