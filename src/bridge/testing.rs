//! In-memory bounded sink
//!
//! A stand-in for a platform transport: a byte buffer with a fixed amount
//! of writable room that only refills when a consumer drains it. Used by
//! this crate's own tests and handy for exercising a bridge without a
//! real socket.

use crate::bridge::PushSink;
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct MemorySinkInner {
    written: Vec<u8>,
    capacity: usize,
    limit: usize,
    closed: bool,
    close_count: usize,
    fail_next_write: bool,
}

/// A capacity-bounded in-memory [`PushSink`].
///
/// Clones share the same buffer, so a test can keep one clone while the
/// bridge owns another: the test side plays the consumer, calling
/// [`drain`](Self::drain) to free capacity (and then signaling the
/// bridge's [`SinkHandle`](crate::SinkHandle)).
#[derive(Debug, Clone)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

impl MemorySink {
    /// A sink that accepts at most `capacity` bytes between drains
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemorySinkInner {
                written: Vec::new(),
                capacity,
                limit: capacity,
                closed: false,
                close_count: 0,
                fail_next_write: false,
            })),
        }
    }

    /// Take everything written so far and restore full capacity.
    ///
    /// This is the consumer side of the transport; after draining, the
    /// readiness handle should be told that space is available.
    pub fn drain(&self) -> Vec<u8> {
        let mut inner = self.inner.lock().unwrap();
        inner.capacity = inner.limit;
        std::mem::take(&mut inner.written)
    }

    /// Snapshot of the bytes written and not yet drained
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().unwrap().written.clone()
    }

    /// How many times `close` has been called
    pub fn close_count(&self) -> usize {
        self.inner.lock().unwrap().close_count
    }

    /// Whether the sink has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Make the next write fail with a streaming error
    pub fn fail_next_write(&self) {
        self.inner.lock().unwrap().fail_next_write = true;
    }
}

impl PushSink for MemorySink {
    fn writable_capacity(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        if inner.closed {
            0
        } else {
            inner.capacity
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(Error::protocol("write after close"));
        }
        if inner.fail_next_write {
            inner.fail_next_write = false;
            return Err(Error::streaming("injected write failure"));
        }
        let accepted = buf.len().min(inner.capacity);
        inner.written.extend_from_slice(&buf[..accepted]);
        inner.capacity -= accepted;
        Ok(accepted)
    }

    fn close(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        inner.close_count += 1;
        Ok(())
    }
}
