//! Backpressure bridge types
//!
//! Defines the bounded push-sink contract and the single-slot readiness
//! state machine shared between the producing task and the sink's event
//! context.

use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ============================================================================
// Push sink contract
// ============================================================================

/// A synchronous, capacity-bounded byte consumer.
///
/// This is the minimal surface of a platform transport primitive: how much
/// room it has right now, a partial write, and a close. Readiness (space
/// freed, faults) arrives out-of-band through a [`SinkHandle`], typically
/// from a different execution context than the producing task.
pub trait PushSink {
    /// How many bytes the sink can currently accept without blocking
    fn writable_capacity(&self) -> usize;

    /// Write up to `buf.len()` bytes, returning how many were accepted.
    ///
    /// An error here is a sink fault and is terminal for the bridge.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Close the sink. The bridge calls this exactly once, on every exit
    /// path.
    fn close(&mut self) -> Result<()>;
}

// ============================================================================
// Readiness slot
// ============================================================================

/// State of the single waiter slot.
///
/// The bridge has exactly one producing path, so at most one waiter can
/// ever be registered; a second registration is a contract violation.
#[derive(Debug)]
enum SlotState {
    /// No waiter, no buffered event
    Idle,
    /// Space was reported while nobody was waiting; the next capacity
    /// check will observe it
    Ready,
    /// The producer is suspended until the next event
    Waiting(oneshot::Sender<Result<()>>),
    /// The sink reported a fault; latched until teardown
    Failed(String),
    /// Torn down; everything after this resolves to cancellation
    Closed,
}

/// Single-slot handoff between the producing task and the sink's event
/// context.
///
/// The mutex is held only to inspect or swap the state, never across an
/// await point.
#[derive(Debug)]
pub(crate) struct ReadinessSlot {
    state: Mutex<SlotState>,
}

impl ReadinessSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Idle),
        }
    }

    /// Record that the sink freed up capacity.
    ///
    /// Resumes the waiter if one is registered; otherwise latches `Ready`
    /// so the next capacity check observes the refreshed capacity.
    pub(crate) fn notify_space(&self) {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, SlotState::Idle) {
            SlotState::Waiting(waiter) => {
                // Receiver may already be gone; that is its problem.
                let _ = waiter.send(Ok(()));
            }
            SlotState::Idle | SlotState::Ready => *state = SlotState::Ready,
            prev @ (SlotState::Failed(_) | SlotState::Closed) => *state = prev,
        }
    }

    /// Record a sink fault.
    ///
    /// Resumes the waiter with a streaming error if one is registered; the
    /// fault stays latched either way. The first fault wins.
    pub(crate) fn notify_error(&self, message: String) {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, SlotState::Idle) {
            SlotState::Waiting(waiter) => {
                let _ = waiter.send(Err(Error::streaming(message.clone())));
                *state = SlotState::Failed(message);
            }
            SlotState::Idle | SlotState::Ready => *state = SlotState::Failed(message),
            prev @ (SlotState::Failed(_) | SlotState::Closed) => *state = prev,
        }
    }

    /// Tear the slot down.
    ///
    /// A registered waiter is resumed with a cancellation error, never
    /// silently dropped. Idempotent.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if let SlotState::Waiting(waiter) = std::mem::replace(&mut *state, SlotState::Closed) {
            let _ = waiter.send(Err(Error::Cancelled));
        }
    }

    /// Surface a latched fault or teardown without suspending.
    pub(crate) fn check(&self) -> Result<()> {
        let state = self.state.lock().unwrap();
        match &*state {
            SlotState::Failed(message) => Err(Error::streaming(message.clone())),
            SlotState::Closed => Err(Error::Cancelled),
            SlotState::Idle | SlotState::Ready | SlotState::Waiting(_) => Ok(()),
        }
    }

    /// Suspend until the sink reports freed capacity, a fault, or
    /// teardown.
    ///
    /// Registers exactly one waiter; attempting a second concurrent
    /// registration fails fast with a protocol violation.
    pub(crate) async fn wait_for_space(&self) -> Result<()> {
        let receiver = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, SlotState::Idle) {
                // Space arrived before we got here; consume the event.
                SlotState::Ready => return Ok(()),
                SlotState::Idle => {
                    let (sender, receiver) = oneshot::channel();
                    *state = SlotState::Waiting(sender);
                    receiver
                }
                prev @ SlotState::Waiting(_) => {
                    *state = prev;
                    return Err(Error::protocol(
                        "a waiter is already registered on the bridge",
                    ));
                }
                SlotState::Failed(message) => {
                    let err = Error::streaming(message.clone());
                    *state = SlotState::Failed(message);
                    return Err(err);
                }
                SlotState::Closed => {
                    *state = SlotState::Closed;
                    return Err(Error::Cancelled);
                }
            }
        };

        match receiver.await {
            Ok(outcome) => outcome,
            // Sender dropped without resolving: the slot itself went away.
            Err(_) => Err(Error::Cancelled),
        }
    }
}

// ============================================================================
// Sink handle
// ============================================================================

/// Readiness-event channel from the sink's execution context back into the
/// bridge.
///
/// Cloneable and sendable; typically handed to whatever callback or thread
/// drives the underlying transport. Events arriving when nobody is
/// suspended are not lost: space is latched for the next capacity check
/// and faults stay latched until surfaced.
#[derive(Debug, Clone)]
pub struct SinkHandle {
    slot: Arc<ReadinessSlot>,
}

impl SinkHandle {
    pub(crate) fn new(slot: Arc<ReadinessSlot>) -> Self {
        Self { slot }
    }

    /// The sink freed up capacity; resume a suspended producer if any.
    pub fn space_available(&self) {
        self.slot.notify_space();
    }

    /// The sink hit a fault; the bridge fails with a streaming error.
    pub fn error(&self, message: impl Into<String>) {
        self.slot.notify_error(message.into());
    }

    /// Cancel the bridge from outside; it fails with a cancellation error
    /// and stops without attempting further writes.
    pub fn cancel(&self) {
        self.slot.close();
    }
}
