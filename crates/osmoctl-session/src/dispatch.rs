//! Demultiplexes the single inbound message stream into one-shot waiters.
//!
//! Responses to requests are matched by (command set, command ID, message
//! ID); the ack bit is ignored because some firmware answers with it set
//! and some without. Unsolicited notifications are matched by exact type.
//! A message nobody is waiting for is parked one-deep per type so a wait
//! registered shortly after arrival still sees it.

use std::collections::HashMap;
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use osmoctl_duml::{Message, MessageId, MessageType};
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{Result, SessionError};

/// Granularity at which cancellable waits re-check the token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
enum WaitKey {
    /// A response with this command identity and echoed message ID.
    Response {
        cmd_set: u8,
        cmd_id: u8,
        id: MessageId,
    },
    /// Any message of exactly this type.
    Type(MessageType),
}

impl WaitKey {
    fn matches(&self, msg: &Message) -> bool {
        match *self {
            WaitKey::Response {
                cmd_set,
                cmd_id,
                id,
            } => {
                msg.msg_type.is_response()
                    && msg.msg_type.cmd_set == cmd_set
                    && msg.msg_type.cmd_id == cmd_id
                    && msg.id == id
            }
            WaitKey::Type(t) => msg.msg_type == t,
        }
    }
}

struct Waiter {
    key: WaitKey,
    tx: SyncSender<Message>,
    token: u64,
}

#[derive(Default)]
struct State {
    waiters: Vec<Waiter>,
    parked: HashMap<MessageType, Message>,
    next_token: u64,
}

/// Routes decoded inbound messages to registered subscriptions.
#[derive(Default)]
pub struct Dispatcher {
    state: Mutex<State>,
}

impl Dispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a one-shot waiter for the response to a request.
    ///
    /// Must be called before the request is sent so the reply cannot race
    /// past the registration.
    pub fn subscribe_response(
        self: &Arc<Self>,
        response_type: MessageType,
        id: MessageId,
    ) -> Subscription {
        self.register(WaitKey::Response {
            cmd_set: response_type.cmd_set,
            cmd_id: response_type.cmd_id,
            id,
        })
    }

    /// Register a one-shot waiter for the next message of a type.
    pub fn subscribe_type(self: &Arc<Self>, msg_type: MessageType) -> Subscription {
        self.register(WaitKey::Type(msg_type))
    }

    fn register(self: &Arc<Self>, key: WaitKey) -> Subscription {
        let (tx, rx) = sync_channel(1);
        let mut state = self.lock();
        let token = state.next_token;
        state.next_token += 1;

        let parked_match = state
            .parked
            .iter()
            .find(|(_, msg)| key.matches(msg))
            .map(|(t, _)| *t);
        if let Some(t) = parked_match {
            if let Some(msg) = state.parked.remove(&t) {
                trace!(msg_type = %t, "claiming parked message");
                let _ = tx.send(msg);
            }
        } else {
            state.waiters.push(Waiter { key, tx, token });
        }

        Subscription {
            dispatcher: Arc::clone(self),
            rx,
            token,
        }
    }

    /// Route one inbound message.
    pub fn dispatch(&self, msg: Message) {
        let mut state = self.lock();
        if let Some(pos) = state.waiters.iter().position(|w| w.key.matches(&msg)) {
            let waiter = state.waiters.remove(pos);
            // The subscription may have been dropped concurrently.
            let _ = waiter.tx.send(msg);
        } else if state.parked.contains_key(&msg.msg_type) {
            debug!(msg_type = %msg.msg_type, "nobody waits for this message, dropping");
        } else {
            trace!(msg_type = %msg.msg_type, "parking message");
            state.parked.insert(msg.msg_type, msg);
        }
    }

    fn deregister(&self, token: u64) {
        self.lock().waiters.retain(|w| w.token != token);
    }
}

/// One-shot handle to an awaited message; deregisters itself on drop.
pub struct Subscription {
    dispatcher: Arc<Dispatcher>,
    rx: Receiver<Message>,
    token: u64,
}

impl Subscription {
    /// Block until the message arrives or the timeout elapses.
    pub fn wait(&self, timeout: Duration) -> Result<Message> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(msg),
            Err(RecvTimeoutError::Timeout) => Err(SessionError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(SessionError::Closed),
        }
    }

    /// Like [`wait`], but re-checks the cancel token between short polls.
    ///
    /// [`wait`]: Subscription::wait
    pub fn wait_cancellable(&self, timeout: Duration, cancel: &CancelToken) -> Result<Message> {
        let deadline = Instant::now() + timeout;
        loop {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(SessionError::Timeout(timeout));
            }
            let slice = CANCEL_POLL_INTERVAL.min(deadline - now);
            match self.rx.recv_timeout(slice) {
                Ok(msg) => return Ok(msg),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(SessionError::Closed),
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispatcher.deregister(self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use osmoctl_duml::InterfaceId;

    fn msg(msg_type: MessageType, id: u16, payload: &[u8]) -> Message {
        Message::new(
            InterfaceId::APP_TO_CAMERA.reversed(),
            MessageId(id),
            msg_type,
            Bytes::copy_from_slice(payload),
        )
    }

    #[test]
    fn response_matches_by_id() {
        let d = Dispatcher::new();
        let sub = d.subscribe_response(MessageType::CONNECT_TO_WIFI_RESULT, MessageId(0x98BB));

        d.dispatch(msg(MessageType::CONNECT_TO_WIFI_RESULT, 0x1111, &[1]));
        d.dispatch(msg(MessageType::CONNECT_TO_WIFI_RESULT, 0x98BB, &[0, 0]));

        let got = sub.wait(Duration::from_millis(100)).unwrap();
        assert_eq!(got.id, MessageId(0x98BB));
        assert_eq!(got.payload.as_ref(), &[0, 0]);
    }

    #[test]
    fn response_matches_without_ack_bit() {
        // Some firmware drops the ack bit in responses: 0x80 flags instead
        // of 0xC0. Both must satisfy the same waiter.
        let d = Dispatcher::new();
        let sub = d.subscribe_response(
            MessageType::START_STOP_STREAMING.response_type(),
            MessageId(0xB4BB),
        );
        d.dispatch(msg(MessageType::START_STOP_STREAMING_RESULT, 0xB4BB, &[0]));
        assert!(sub.wait(Duration::from_millis(100)).is_ok());
    }

    #[test]
    fn type_wait_ignores_id() {
        let d = Dispatcher::new();
        let sub = d.subscribe_type(MessageType::BATTERY_STATUS);
        d.dispatch(msg(MessageType::BATTERY_STATUS, 0x0042, &[0; 13]));
        assert!(sub.wait(Duration::from_millis(100)).is_ok());
    }

    #[test]
    fn unclaimed_message_is_parked_one_deep() {
        let d = Dispatcher::new();
        d.dispatch(msg(MessageType::PAIRING_STATUS, 1, &[0x00, 0x01]));
        d.dispatch(msg(MessageType::PAIRING_STATUS, 2, &[0x00, 0x00]));

        // The first arrival wins the parking slot; the second is dropped.
        let sub = d.subscribe_type(MessageType::PAIRING_STATUS);
        let got = sub.wait(Duration::from_millis(100)).unwrap();
        assert_eq!(got.id, MessageId(1));
    }

    #[test]
    fn wait_times_out() {
        let d = Dispatcher::new();
        let sub = d.subscribe_type(MessageType::STATUS);
        assert!(matches!(
            sub.wait(Duration::from_millis(20)),
            Err(SessionError::Timeout(_))
        ));
    }

    #[test]
    fn dropped_subscription_deregisters() {
        let d = Dispatcher::new();
        let sub = d.subscribe_type(MessageType::STATUS);
        drop(sub);
        // With no waiter left the message parks instead of being lost.
        d.dispatch(msg(MessageType::STATUS, 7, &[]));
        let sub = d.subscribe_type(MessageType::STATUS);
        assert!(sub.wait(Duration::from_millis(100)).is_ok());
    }

    #[test]
    fn cancellable_wait_observes_cancel() {
        let d = Dispatcher::new();
        let sub = d.subscribe_type(MessageType::STATUS);
        let cancel = CancelToken::new();

        let canceller = cancel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(60));
            canceller.cancel();
        });

        let started = Instant::now();
        let got = sub.wait_cancellable(Duration::from_secs(10), &cancel);
        assert!(matches!(got, Err(SessionError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(2));
        handle.join().unwrap();
    }

    #[test]
    fn concurrent_same_type_waiters_are_served_in_order() {
        let d = Dispatcher::new();
        let first = d.subscribe_type(MessageType::BATTERY_STATUS);
        let second = d.subscribe_type(MessageType::BATTERY_STATUS);

        d.dispatch(msg(MessageType::BATTERY_STATUS, 1, &[]));
        d.dispatch(msg(MessageType::BATTERY_STATUS, 2, &[]));

        assert_eq!(first.wait(Duration::from_millis(100)).unwrap().id.0, 1);
        assert_eq!(second.wait(Duration::from_millis(100)).unwrap().id.0, 2);
    }
}
