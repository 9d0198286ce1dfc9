//! Cursor-driven pagination sequences
//!
//! Turns a single paged operation into a lazy, forward-only stream of
//! pages. The stream owns the current input and a single in-flight call;
//! request *n+1* is only issued after response *n* has been fully
//! received, so no two cursors from the same sequence are ever in flight
//! concurrently.
//!
//! # Overview
//!
//! The paginate module provides:
//! - [`paginate`] - Build a page stream from an operation and two cursor
//!   accessors
//! - [`PageStream`] - The underlying stream state machine
//! - [`collect_pages`] - Reduce a page stream into a `Vec`, stopping at
//!   the first error
//!
//! The sequence ends the first time a page carries no next-cursor; that
//! page is still delivered. An operation failure is delivered exactly once
//! and ends the sequence. Cancelling the consuming task simply stops
//! polling; a request already on the wire is the transport's business.
//!
//! A backend that keeps returning the same cursor will paginate forever.
//! Guaranteeing forward progress is part of the operation's contract, not
//! something this module detects.

use crate::error::Result;
use futures::ready;
use futures::stream::Stream;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

// ============================================================================
// Construction
// ============================================================================

/// Build a lazy page stream from a paged operation.
///
/// Arguments:
/// - `initial`: the first request input, sent verbatim (its cursor field,
///   if any, marks where the sequence starts)
/// - `call`: the operation itself; may suspend, may fail
/// - `next_cursor`: extracts the optional continuation cursor from an
///   output
/// - `with_cursor`: produces the next input from the previous input and
///   the extracted cursor
///
/// The stream is single-pass: once it has ended (last page delivered or an
/// error surfaced) it only ever yields `None`.
///
/// Any ambient state the operation needs (client handle, signing context)
/// travels inside the `call` closure; this layer only sees input and
/// output values.
pub fn paginate<I, O, C, F, Fut, G, S>(
    initial: I,
    call: F,
    next_cursor: G,
    with_cursor: S,
) -> PageStream<I, F, Fut, G, S>
where
    I: Clone,
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<O>>,
    G: Fn(&O) -> Option<C>,
    S: Fn(I, C) -> I,
{
    PageStream {
        input: Some(initial),
        call,
        next_cursor,
        with_cursor,
        in_flight: None,
        pages: 0,
    }
}

pin_project! {
    /// A lazy, single-pass stream of pages from a cursor-paged operation.
    ///
    /// Created by [`paginate`].
    pub struct PageStream<I, F, Fut, G, S> {
        // None once the sequence has ended, for any reason
        input: Option<I>,
        call: F,
        next_cursor: G,
        with_cursor: S,
        #[pin]
        in_flight: Option<Fut>,
        pages: u64,
    }
}

// ============================================================================
// Stream state machine
// ============================================================================

impl<I, O, C, F, Fut, G, S> Stream for PageStream<I, F, Fut, G, S>
where
    I: Clone,
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<O>>,
    G: Fn(&O) -> Option<C>,
    S: Fn(I, C) -> I,
{
    type Item = Result<O>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Await the in-flight call first; only one is ever pending.
            if let Some(call_future) = this.in_flight.as_mut().as_pin_mut() {
                let result = ready!(call_future.poll(cx));
                this.in_flight.set(None);

                match result {
                    Ok(output) => {
                        *this.pages += 1;
                        match (this.next_cursor)(&output) {
                            Some(cursor) => {
                                trace!(page = *this.pages, "page fetched, cursor continues");
                                *this.input =
                                    this.input.take().map(|input| (this.with_cursor)(input, cursor));
                            }
                            None => {
                                debug!(pages = *this.pages, "pagination complete");
                                *this.input = None;
                            }
                        }
                        return Poll::Ready(Some(Ok(output)));
                    }
                    Err(err) => {
                        debug!(pages = *this.pages, "pagination ended by operation failure");
                        *this.input = None;
                        return Poll::Ready(Some(Err(err)));
                    }
                }
            }

            // No call pending: either start the next one or end the stream.
            match this.input.as_ref() {
                Some(input) => {
                    let call_future = (this.call)(input.clone());
                    this.in_flight.set(Some(call_future));
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Drain a page stream into a `Vec`, stopping at the first error.
///
/// Pages already received before a mid-stream failure are dropped by this
/// helper; consume the stream directly if partial results matter.
pub async fn collect_pages<St, O>(pages: St) -> Result<Vec<O>>
where
    St: Stream<Item = Result<O>>,
{
    use futures::TryStreamExt;
    pages.try_collect().await
}
