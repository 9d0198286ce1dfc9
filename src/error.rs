//! Error types for Pagewire
//!
//! This module defines the error hierarchy for the whole engine.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for Pagewire
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// The underlying paged operation failed. Terminal for the sequence
    /// that produced it; never retried at this layer.
    #[error("Paged operation failed: {source}")]
    Operation {
        /// The client-supplied failure, surfaced verbatim
        #[source]
        source: anyhow::Error,
    },

    // ============================================================================
    // Streaming Errors
    // ============================================================================
    /// The push sink reported a fault during streaming. Terminal for the
    /// bridge; the sink is still closed.
    #[error("Streaming error: {message}")]
    Streaming {
        /// Description of the sink fault
        message: String,
    },

    /// The surrounding task was cancelled. Distinguished from
    /// [`Error::Streaming`] so callers can tell deliberate cancellation
    /// from transport faults.
    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Contract Violations
    // ============================================================================
    /// A programming-contract violation, e.g. registering a second
    /// concurrent waiter on the backpressure bridge. Not a recoverable
    /// runtime condition.
    #[error("Protocol violation: {message}")]
    ProtocolViolation {
        /// Which contract was broken
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// An I/O error from a sink or source adapter
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Any other foreign error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create an operation error from any client failure
    pub fn operation(source: impl Into<anyhow::Error>) -> Self {
        Self::Operation {
            source: source.into(),
        }
    }

    /// Create a streaming error
    pub fn streaming(message: impl Into<String>) -> Self {
        Self::Streaming {
            message: message.into(),
        }
    }

    /// Create a protocol violation error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Check if this error is a deliberate cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if this error is a programming-contract violation
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::ProtocolViolation { .. })
    }
}

/// Result type alias for Pagewire
pub type Result<T> = std::result::Result<T, Error>;
