//! Integration tests
//!
//! Exercises pagination, rechunking, and the backpressure bridge composed
//! the way a client runtime composes them: a paged backend feeding a body
//! stream that is rechunked and then pushed into a bounded transport.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use pagewire::bridge::testing::MemorySink;
use pagewire::{paginate, BackpressureBridge, BoxByteStream, RechunkExt, Result, SinkHandle};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Route engine logs into the test harness when `RUST_LOG` is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Fake paged backends
// ============================================================================

#[derive(Debug, Clone)]
struct PageInput {
    cursor: Option<usize>,
}

#[derive(Debug)]
struct ItemPage {
    items: Vec<u32>,
    next: Option<usize>,
}

#[derive(Debug)]
struct BlobPage {
    data: Bytes,
    next: Option<usize>,
}

/// Pages of `page_size` integers out of `0..total`.
fn item_backend(
    total: u32,
    page_size: usize,
) -> impl FnMut(PageInput) -> BoxFuture<'static, Result<ItemPage>> {
    move |input: PageInput| {
        let start = input.cursor.unwrap_or(0);
        let end = (start + page_size).min(total as usize);
        futures::future::ok(ItemPage {
            items: (start as u32..end as u32).collect(),
            next: (end < total as usize).then_some(end),
        })
        .boxed()
    }
}

/// Pages of `page_size` bytes out of `body`, as a request-body backend
/// would produce them.
fn blob_backend(
    body: Vec<u8>,
    page_size: usize,
) -> impl FnMut(PageInput) -> BoxFuture<'static, Result<BlobPage>> {
    move |input: PageInput| {
        let body = body.clone();
        async move {
            let start = input.cursor.unwrap_or(0);
            let end = (start + page_size).min(body.len());
            Ok(BlobPage {
                data: Bytes::copy_from_slice(&body[start..end]),
                next: (end < body.len()).then_some(end),
            })
        }
        .boxed()
    }
}

/// Play the transport's consumer side: drain the sink and report freed
/// space until the bridge finishes.
async fn pump_to_completion(
    task: tokio::task::JoinHandle<Result<()>>,
    sink: &MemorySink,
    handle: &SinkHandle,
) -> Vec<u8> {
    let mut received = Vec::new();

    timeout(Duration::from_secs(5), async {
        while !task.is_finished() {
            sleep(Duration::from_millis(2)).await;
            let drained = sink.drain();
            if !drained.is_empty() {
                received.extend(drained);
                handle.space_available();
            }
        }
        task.await.unwrap().unwrap();
    })
    .await
    .expect("bridge did not finish in time");

    received.extend(sink.drain());
    received
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_reduce_23_items_in_pages_of_4() {
    let pages = paginate(
        PageInput { cursor: None },
        item_backend(23, 4),
        |page: &ItemPage| page.next,
        |_input, cursor| PageInput {
            cursor: Some(cursor),
        },
    );

    let mut pages = std::pin::pin!(pages);
    let mut sizes = Vec::new();
    let mut reduced = Vec::new();
    while let Some(page) = pages.next().await {
        let page = page.unwrap();
        sizes.push(page.items.len());
        reduced.extend(page.items);
    }

    assert_eq!(sizes, vec![4, 4, 4, 4, 4, 3]);
    assert_eq!(reduced, (0..23).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_paginated_body_rechunked() {
    // 50 bytes arriving in 9-byte pages, re-emitted as exact 5-byte
    // chunks.
    let body: Vec<u8> = (0u8..50).collect();
    let pages = paginate(
        PageInput { cursor: None },
        blob_backend(body.clone(), 9),
        |page: &BlobPage| page.next,
        |_input, cursor| PageInput {
            cursor: Some(cursor),
        },
    );

    let chunks: Vec<Bytes> = pages
        .map(|page| page.map(|p| p.data))
        .fixed_chunks(5)
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;

    assert!(chunks.iter().all(|c| c.len() == 5));
    let flattened: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(flattened, body);
}

#[tokio::test]
async fn test_paginate_rechunk_bridge_end_to_end() {
    init_tracing();

    // Paged backend -> body stream -> 5-byte rechunker -> bounded sink
    // with room for 7 bytes at a time. Boxed the way a client runtime
    // hands an assembled body pipeline to its transport layer.
    let body: Vec<u8> = (0u8..61).collect();
    let pages = paginate(
        PageInput { cursor: None },
        blob_backend(body.clone(), 13),
        |page: &BlobPage| page.next,
        |_input, cursor| PageInput {
            cursor: Some(cursor),
        },
    );
    let source: BoxByteStream =
        Box::pin(pages.map(|page| page.map(|p| p.data)).fixed_chunks(5));

    let sink = MemorySink::with_capacity(7);
    let bridge = BackpressureBridge::new(source, sink.clone());
    let handle = bridge.handle();
    let task = tokio::spawn(bridge.run());

    let received = pump_to_completion(task, &sink, &handle).await;

    assert_eq!(received, body);
    assert_eq!(sink.close_count(), 1);
}

#[tokio::test]
async fn test_mid_stream_failure_reaches_bridge_and_sink_closes() {
    // The body stream fails partway; the bridge surfaces the error and
    // still closes the sink.
    let source = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"partial ")),
        Err(pagewire::Error::streaming("body stream died")),
    ])
    .fixed_chunks(4);

    let sink = MemorySink::with_capacity(64);
    let bridge = BackpressureBridge::new(source, sink.clone());

    let err = bridge.run().await.unwrap_err();
    assert!(err.to_string().contains("body stream died"));
    assert_eq!(sink.close_count(), 1);
}
