//! Fixed-size rechunking of byte streams
//!
//! Wraps an arbitrarily-fragmented byte stream and re-emits buffers of an
//! exact target size; only the final chunk may be shorter, and zero-length
//! chunks are never emitted. Total bytes out always equals total bytes
//! pulled from upstream, unless the upstream fails: an error is terminal
//! and any partial buffer dies with the stream.
//!
//! The adapter carries at most one partial buffer between pulls and
//! performs no suspension of its own beyond awaiting its upstream.

use crate::error::Result;
use crate::types::{ByteChunkStream, ChunkResult};
use bytes::{Bytes, BytesMut};
use futures::ready;
use futures::stream::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Stream adapter emitting chunks of exactly `chunk_size` bytes.
    ///
    /// Created by [`FixedChunks::new`] or [`RechunkExt::fixed_chunks`].
    pub struct FixedChunks<S> {
        #[pin]
        upstream: S,
        // Bytes pulled from upstream but not yet emitted
        pending: BytesMut,
        chunk_size: usize,
        upstream_done: bool,
    }
}

impl<S> FixedChunks<S>
where
    S: Stream<Item = ChunkResult>,
{
    /// Wrap `upstream`, re-emitting its bytes in `chunk_size` pieces.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero; that is a programming-contract
    /// violation, not a runtime condition.
    pub fn new(upstream: S, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            upstream,
            pending: BytesMut::new(),
            chunk_size,
            upstream_done: false,
        }
    }

    /// The configured output chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<S> Stream for FixedChunks<S>
where
    S: Stream<Item = ChunkResult>,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // A full chunk may already be buffered; emit without pulling.
            if this.pending.len() >= *this.chunk_size {
                let chunk = this.pending.split_to(*this.chunk_size).freeze();
                return Poll::Ready(Some(Ok(chunk)));
            }

            if *this.upstream_done {
                if this.pending.is_empty() {
                    return Poll::Ready(None);
                }
                // Final short chunk: whatever remains, never empty.
                let rest = this.pending.split_off(0).freeze();
                return Poll::Ready(Some(Ok(rest)));
            }

            match ready!(this.upstream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    // Empty upstream chunks carry no bytes and are skipped.
                    if !chunk.is_empty() {
                        this.pending.extend_from_slice(&chunk);
                    }
                }
                Some(Err(err)) => {
                    // Terminal: fuse and drop any partial buffer.
                    *this.upstream_done = true;
                    this.pending.clear();
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    *this.upstream_done = true;
                }
            }
        }
    }
}

// ============================================================================
// Extension trait
// ============================================================================

/// Rechunking adapter for any byte chunk stream
pub trait RechunkExt: ByteChunkStream + Sized {
    /// Re-emit this stream's bytes in chunks of exactly `chunk_size`
    /// bytes; the final chunk may be shorter.
    fn fixed_chunks(self, chunk_size: usize) -> FixedChunks<Self> {
        FixedChunks::new(self, chunk_size)
    }
}

impl<S> RechunkExt for S where S: ByteChunkStream + Sized {}
