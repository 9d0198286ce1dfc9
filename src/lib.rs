//! # Pagewire
//!
//! The streaming-and-pagination engine of an API client runtime: turns a
//! single network call into a lazy, cursor-driven sequence of result pages,
//! and moves request/response bodies between an asynchronous producer and a
//! synchronous, capacity-limited consumer with correct backpressure.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Any paged operation becomes a lazy `Stream` of
//!   pages, driven one request at a time
//! - **Fixed-Size Rechunking**: Re-emit an arbitrarily-fragmented byte
//!   stream as exact-size chunks (last chunk may be shorter)
//! - **Backpressure Bridge**: Drive an async byte source into a bounded
//!   synchronous sink, suspending whenever the sink has no room
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use pagewire::{paginate, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut pages = std::pin::pin!(paginate(
//!         ListUsersInput { cursor: None },
//!         |input| client.list_users(input),
//!         |output| output.next_cursor.clone(),
//!         |input, cursor| ListUsersInput { cursor: Some(cursor), ..input },
//!     ));
//!
//!     while let Some(page) = pages.next().await {
//!         let page = page?;
//!         // Process one page of users
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        User code                            │
//! │        for await page in paginate(input, call, ..)          │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴─────────────┬────────────────┐
//! │   Paginate   │          Rechunk            │     Bridge     │
//! ├──────────────┼─────────────────────────────┼────────────────┤
//! │ cursor state │ pending buffer + split      │ bounded writes │
//! │ one in-flight│ exact-size output chunks    │ single waiter  │
//! │ request      │ byte conservation           │ close-once     │
//! └──────────────┴─────────────────────────────┴────────────────┘
//! ```
//!
//! Request construction, authentication, encoding, retries, and transport
//! all live in the surrounding client; this crate only consumes an
//! already-built operation call and raw byte producers/consumers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the engine
pub mod error;

/// Common types and type aliases
pub mod types;

/// Cursor-driven pagination sequences
pub mod paginate;

/// Fixed-size rechunking of byte streams
pub mod rechunk;

/// Pull/push backpressure bridge
pub mod bridge;

// ============================================================================
// Re-exports
// ============================================================================

pub use bridge::{BackpressureBridge, PushSink, SinkHandle};
pub use error::{Error, Result};
pub use paginate::paginate;
pub use rechunk::{FixedChunks, RechunkExt};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
