//! Pull/push backpressure bridge
//!
//! Adapts an asynchronous pull-based byte source (for example an outgoing
//! request body) to a synchronous, capacity-bounded push sink (for example
//! a platform socket wrapper that only exposes "write if space, notify
//! when space frees up").
//!
//! # Overview
//!
//! The bridge module provides:
//! - [`BackpressureBridge`] - Drives a byte source into a sink to
//!   completion
//! - [`PushSink`] - The minimal bounded-sink contract
//! - [`SinkHandle`] - Readiness events from the sink's execution context
//! - [`testing`] - An in-memory bounded sink
//!
//! The producing task and the sink's event context meet in a single-slot
//! handoff: when the sink has no room the producer registers exactly one
//! waiter and suspends; a space/fault/teardown event resumes it. A waiter
//! is never abandoned, and the sink is closed exactly once on every exit
//! path.
//!
//! Bytes reach the sink in exactly the order they were pulled from the
//! source.

mod types;
pub mod testing;

pub use types::{PushSink, SinkHandle};

pub(crate) use types::ReadinessSlot;

use crate::error::{Error, Result};
use crate::types::ByteChunkStream;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Drives an asynchronous byte source into a bounded synchronous sink.
///
/// Created per request body; single-use. [`run`](Self::run) consumes the
/// bridge and resolves once the source is exhausted and the sink closed,
/// or with the first failure. Dropping an unfinished bridge still closes
/// the sink and resumes any registered waiter.
pub struct BackpressureBridge<St, Si: PushSink> {
    source: St,
    sink: Si,
    slot: Arc<ReadinessSlot>,
    closed: bool,
}

impl<St, Si> BackpressureBridge<St, Si>
where
    St: ByteChunkStream + Unpin,
    Si: PushSink,
{
    /// Create a bridge from a byte source and a sink
    pub fn new(source: St, sink: Si) -> Self {
        Self {
            source,
            sink,
            slot: Arc::new(ReadinessSlot::new()),
            closed: false,
        }
    }

    /// Readiness-event channel for the sink's execution context.
    ///
    /// Hand this to whatever drives the underlying transport so it can
    /// report freed capacity, faults, or cancellation.
    pub fn handle(&self) -> SinkHandle {
        SinkHandle::new(Arc::clone(&self.slot))
    }

    /// Drive the source into the sink until the source is exhausted.
    ///
    /// Fails with [`Error::Streaming`] on a sink fault, with
    /// [`Error::Cancelled`] on external cancellation, or with the source's
    /// own error verbatim. The sink is closed exactly once whichever way
    /// this resolves.
    pub async fn run(mut self) -> Result<()> {
        let outcome = self.drive().await;
        let close_outcome = self.finish();
        outcome.and(close_outcome)
    }

    async fn drive(&mut self) -> Result<()> {
        while let Some(chunk) = self.source.next().await {
            let chunk = chunk?;
            self.write_chunk(&chunk).await?;
        }
        Ok(())
    }

    /// Write one chunk fully, suspending whenever the sink has no room.
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let mut offset = 0;
        while offset < chunk.len() {
            // A fault or cancellation may have been latched while we were
            // not suspended.
            self.slot.check()?;

            let capacity = self.sink.writable_capacity();
            if capacity == 0 {
                self.slot.wait_for_space().await?;
                continue;
            }

            let end = chunk.len().min(offset + capacity);
            let written = self.sink.write(&chunk[offset..end]).map_err(as_streaming)?;
            trace!(written, remaining = chunk.len() - offset, "sink write");
            if written == 0 {
                // Capacity raced to zero under us; treat like a full sink.
                self.slot.wait_for_space().await?;
                continue;
            }
            offset += written;
        }
        Ok(())
    }

    /// Close the sink and tear down the slot. Idempotent.
    fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.slot.close();
        let outcome = self.sink.close().map_err(as_streaming);
        debug!("sink closed");
        outcome
    }
}

impl<St, Si: PushSink> Drop for BackpressureBridge<St, Si> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            // Resumes a registered waiter as cancelled rather than leaking
            // it, then releases the sink.
            self.slot.close();
            let _ = self.sink.close();
        }
    }
}

/// Fold sink faults into the streaming taxonomy, keeping cancellation and
/// existing streaming errors as they are.
fn as_streaming(err: Error) -> Error {
    match err {
        Error::Streaming { .. } | Error::Cancelled | Error::ProtocolViolation { .. } => err,
        other => Error::streaming(other.to_string()),
    }
}
