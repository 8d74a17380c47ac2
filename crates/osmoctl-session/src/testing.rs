//! In-memory transport for exercising sessions without a device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use osmoctl_transport::{Transport, TransportError};

/// Scripted transport: tests push inbound buffers, sessions drain them,
/// and everything sent is recorded for assertions.
#[derive(Clone)]
pub(crate) struct MockTransport {
    inner: Arc<Inner>,
}

struct Inner {
    inbound: Mutex<VecDeque<Bytes>>,
    available: Condvar,
    sent: Arc<Mutex<Vec<Bytes>>>,
    pairing_sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                inbound: Mutex::new(VecDeque::new()),
                available: Condvar::new(),
                sent: Arc::new(Mutex::new(Vec::new())),
                pairing_sent: Arc::new(Mutex::new(Vec::new())),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Queue a buffer for the session's reader thread.
    pub fn push_inbound(&self, buf: Bytes) {
        self.inner.inbound.lock().unwrap().push_back(buf);
        self.inner.available.notify_all();
    }

    /// Shared view of every buffer the session sent.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<Bytes>>> {
        Arc::clone(&self.inner.sent)
    }

    /// Shared view of every pairing-channel buffer the session sent.
    pub fn pairing_sent_handle(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.inner.pairing_sent)
    }
}

impl Transport for MockTransport {
    fn send(&self, buf: &[u8]) -> osmoctl_transport::Result<()> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.inner
            .sent
            .lock()
            .unwrap()
            .push(Bytes::copy_from_slice(buf));
        Ok(())
    }

    fn recv_timeout(&self, timeout: Duration) -> osmoctl_transport::Result<Option<Bytes>> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let deadline = Instant::now() + timeout;
        let mut queue = self.inner.inbound.lock().unwrap();
        loop {
            if let Some(buf) = queue.pop_front() {
                return Ok(Some(buf));
            }
            if self.inner.closed.load(Ordering::SeqCst) {
                return Err(TransportError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let (guard, _) = self
                .inner
                .available
                .wait_timeout(queue, deadline - now)
                .unwrap();
            queue = guard;
        }
    }

    fn send_pairing_request(&self, buf: &[u8]) -> osmoctl_transport::Result<()> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.inner.pairing_sent.lock().unwrap().push(buf.to_vec());
        Ok(())
    }

    fn close(&self) -> osmoctl_transport::Result<()> {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.available.notify_all();
        Ok(())
    }
}
