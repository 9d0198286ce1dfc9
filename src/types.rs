//! Common types used throughout Pagewire
//!
//! This module contains the shared stream vocabulary: everything in the
//! engine moves either opaque byte chunks or page values through
//! forward-only, suspend-capable pull interfaces.

use crate::error::Result;
use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;

// ============================================================================
// Type Aliases
// ============================================================================

/// One pulled byte chunk, or the error that ended the stream
pub type ChunkResult = Result<Bytes>;

/// A boxed, sendable stream of byte chunks
pub type BoxByteStream = Pin<Box<dyn Stream<Item = ChunkResult> + Send>>;

// ============================================================================
// Byte Chunk Streams
// ============================================================================

/// An ordered, forward-only sequence of opaque byte buffers.
///
/// No random access: a consumer may only pull the next chunk or stop.
/// Implemented for free by every `Stream` of [`ChunkResult`].
pub trait ByteChunkStream: Stream<Item = ChunkResult> {}

impl<S> ByteChunkStream for S where S: Stream<Item = ChunkResult> {}

/// Build a byte chunk stream from in-memory buffers.
///
/// Chunk boundaries are preserved exactly as given, which makes this the
/// standard way to exercise the rechunker and bridge against arbitrary
/// upstream fragmentation.
pub fn byte_stream(chunks: Vec<Bytes>) -> impl Stream<Item = ChunkResult> + Send + Unpin {
    futures::stream::iter(chunks.into_iter().map(Ok))
}

/// A byte chunk stream with no chunks at all
pub fn empty_byte_stream() -> impl Stream<Item = ChunkResult> + Send + Unpin {
    futures::stream::iter(std::iter::empty::<ChunkResult>())
}
