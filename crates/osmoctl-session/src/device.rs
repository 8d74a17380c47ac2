//! Device session: a reader thread feeding the dispatcher, plus the
//! send/request primitives every choreography builds on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use osmoctl_duml::{decode_message, encode_message, DeviceType, Message, MessageType};
use osmoctl_transport::{Transport, TransportError};
use tracing::{debug, trace, warn};

use crate::dispatch::{Dispatcher, Subscription};
use crate::error::{Result, SessionError};

/// Tunables for a device session.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// How long a request waits for its response.
    pub request_timeout: Duration,
    /// How long pairing waits for the user to approve the PIN on camera.
    pub pairing_timeout: Duration,
    /// How often the reader thread polls the transport.
    pub poll_interval: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            pairing_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// A live session with one device over any [`Transport`].
///
/// A background thread drains the transport, decodes DUML frames and hands
/// them to the dispatcher; undecodable buffers are logged and skipped.
/// [`init`] must complete before messages are sent.
///
/// [`init`]: Device::init
pub struct Device<T: Transport + 'static> {
    transport: Arc<T>,
    dispatcher: Arc<Dispatcher>,
    device_type: DeviceType,
    config: DeviceConfig,
    initialized: AtomicBool,
    shutdown: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport + 'static> Device<T> {
    pub fn new(transport: T, device_type: DeviceType) -> Self {
        Self::with_config(transport, device_type, DeviceConfig::default())
    }

    pub fn with_config(transport: T, device_type: DeviceType, config: DeviceConfig) -> Self {
        let transport = Arc::new(transport);
        let dispatcher = Dispatcher::new();
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader = {
            let transport = Arc::clone(&transport);
            let dispatcher = Arc::clone(&dispatcher);
            let shutdown = Arc::clone(&shutdown);
            let poll = config.poll_interval;
            std::thread::spawn(move || {
                reader_loop(transport.as_ref(), &dispatcher, &shutdown, poll);
            })
        };

        Self {
            transport,
            dispatcher,
            device_type,
            config,
            initialized: AtomicBool::new(false),
            shutdown,
            reader: Mutex::new(Some(reader)),
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Wait for the first status notification from the device.
    ///
    /// The device emits these continuously once the link is up; seeing one
    /// proves the inbound path works end to end.
    pub fn init(&self, timeout: Duration) -> Result<()> {
        let sub = self.dispatcher.subscribe_type(MessageType::STATUS);
        let status = sub.wait(timeout)?;
        debug!(msg = %status, "received device status");
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(SessionError::NotInitialized);
        }
        Ok(())
    }

    /// Encode and send one message, fire-and-forget.
    pub fn send_message(&self, msg: &Message) -> Result<()> {
        self.ensure_initialized()?;
        trace!(%msg, "sending message");
        self.transport.send(&encode_message(msg))?;
        Ok(())
    }

    /// Send on the transport's dedicated pairing channel.
    pub fn send_pairing_request(&self, buf: &[u8]) -> Result<()> {
        self.ensure_initialized()?;
        self.transport.send_pairing_request(buf)?;
        Ok(())
    }

    /// Send a request and wait for its correlated response.
    ///
    /// The waiter is registered before the send so the reply cannot be
    /// lost to a race. Fails without sending when the message type does
    /// not carry the ack-required flag.
    pub fn request(&self, msg: &Message) -> Result<Message> {
        if !msg.msg_type.requires_ack() {
            return Err(SessionError::AckRequiredMissing {
                msg_type: msg.msg_type,
            });
        }
        let sub = self
            .dispatcher
            .subscribe_response(msg.msg_type.response_type(), msg.id);
        self.send_message(msg)?;
        sub.wait(self.config.request_timeout)
    }

    /// Wait for the next message of a type without sending anything.
    pub fn receive_message(&self, msg_type: MessageType, timeout: Duration) -> Result<Message> {
        self.dispatcher.subscribe_type(msg_type).wait(timeout)
    }

    /// Register a waiter for the next message of a type.
    ///
    /// Use this to register before a send when the interesting reply is a
    /// side-channel notification rather than a correlated response.
    pub fn subscribe(&self, msg_type: MessageType) -> Subscription {
        self.dispatcher.subscribe_type(msg_type)
    }

    /// Stop the reader thread and close the transport.
    pub fn close(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.transport.close()?;
        let handle = self
            .reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl<T: Transport + 'static> Drop for Device<T> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn reader_loop(
    transport: &dyn Transport,
    dispatcher: &Dispatcher,
    shutdown: &AtomicBool,
    poll: Duration,
) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match transport.recv_timeout(poll) {
            Ok(Some(buf)) => match decode_message(&buf) {
                Ok(msg) => {
                    trace!(%msg, "received message");
                    dispatcher.dispatch(msg);
                }
                Err(e) => debug!(error = %e, len = buf.len(), "skipping undecodable buffer"),
            },
            Ok(None) => {}
            Err(TransportError::Closed) => break,
            Err(e) => {
                warn!(error = %e, "transport receive failed, stopping reader");
                break;
            }
        }
    }
    debug!("reader thread exiting");
}
