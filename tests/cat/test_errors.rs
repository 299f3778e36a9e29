//! Tests for first-error-wins propagation and post-error draining.

use super::support::{closed, events, failing_source, with_close_signal};
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use stream_cat::{
    AsyncStream, AsyncTask, CatError, CatOptions, CatResult, Deferred, Item, LiveSource, cat,
    cat_with_options,
};

#[tokio::test]
async fn test_only_first_error_is_surfaced_and_all_items_drain() {
    let (third, third_released) = with_close_signal(failing_source("3", "third failed"));

    let stream = cat(vec![
        Item::from("1"),
        Item::from(failing_source("2", "second failed")),
        Item::from(third),
    ]);

    assert_eq!(events(stream).await, vec!["1", "2", "error: second failed"]);
    closed(third_released).await;
}

#[tokio::test]
async fn test_items_after_error_are_drained_but_discarded() {
    let (tail, tail_released) = with_close_signal(LiveSource::from_chunks(["never", "seen"]));

    let stream = cat(vec![
        Item::from(Deferred::rejected("early")),
        Item::from("dropped"),
        Item::from(Deferred::resolved("also dropped")),
        Item::from(tail),
    ]);

    assert_eq!(events(stream).await, vec!["error: early"]);
    closed(tail_released).await;
}

#[tokio::test]
async fn test_invalid_item_names_its_type() {
    let stream = cat(vec![Item::from("a"), Item::from_any(42_i32), Item::from("b")]);

    assert_eq!(
        events(stream).await,
        vec![
            "a",
            "error: Invalid stream component 'i32', must be: Readable source, Buffer, or Promise",
        ]
    );
}

#[tokio::test]
async fn test_from_any_accepts_supported_types() {
    let (task_tx, task) = AsyncTask::<CatResult<Item>>::pending();
    task_tx.send(Ok(Item::from("i"))).unwrap();
    let (chunk_tx, chunks) = AsyncStream::<CatResult<Bytes>>::channel();
    chunk_tx.send(Ok(Bytes::from("j"))).unwrap();
    drop(chunk_tx);

    let task = Item::from_any(task);
    let chunks = Item::from_any(chunks);
    assert_eq!(task.kind(), "deferred");
    assert_eq!(chunks.kind(), "live");

    let stream = cat(vec![
        Item::from_any(Bytes::from("a")),
        Item::from_any(b"b".to_vec()),
        Item::from_any("c"),
        Item::from_any(String::from("d")),
        Item::from_any(Deferred::resolved("e")),
        Item::from_any(LiveSource::from_chunks(["f"])),
        Item::from_any(cat(["g"])),
        Item::from_any(Item::from("h")),
        task,
        chunks,
    ]);
    assert_eq!(stream.collect_bytes().await.unwrap(), Bytes::from("abcdefghij"));
}

#[tokio::test]
async fn test_invalid_item_after_earlier_error_is_swallowed() {
    let stream = cat(vec![
        Item::from(Deferred::rejected("first")),
        Item::from_any(3.5_f64),
    ]);
    assert_eq!(events(stream).await, vec!["error: first"]);
}

#[tokio::test]
async fn test_early_error_from_later_source_waits_for_its_turn() {
    let (first_tx, first) = AsyncStream::<CatResult<Bytes>>::channel();
    let (second_tx, second) = AsyncStream::<CatResult<Bytes>>::channel();

    // The later source fails before the earlier one has produced anything.
    second_tx.send(Err(CatError::from("early"))).unwrap();
    drop(second_tx);

    let stream = cat(vec![Item::from(first), Item::from(second)]);

    tokio::spawn(async move {
        tokio::task::yield_now().await;
        first_tx.send(Ok(Bytes::from("a"))).unwrap();
        tokio::task::yield_now().await;
        first_tx.send(Ok(Bytes::from("b"))).unwrap();
    });

    assert_eq!(events(stream).await, vec!["a", "b", "error: early"]);
}

#[tokio::test]
async fn test_earlier_error_beats_error_raised_first_by_later_item() {
    let (first_tx, first) = AsyncStream::<CatResult<Bytes>>::channel();
    let (second_tx, second) = AsyncStream::<CatResult<Bytes>>::channel();

    second_tx.send(Err(CatError::from("later item"))).unwrap();
    drop(second_tx);

    let stream = cat(vec![Item::from(first), Item::from(second)]);

    tokio::spawn(async move {
        tokio::task::yield_now().await;
        first_tx.send(Err(CatError::from("earlier item"))).unwrap();
    });

    assert_eq!(events(stream).await, vec!["error: earlier item"]);
}

#[tokio::test]
async fn test_error_mapper_applies_to_surfaced_error() {
    let options = CatOptions::new().error_mapper(|e| e.context("while concatenating"));
    let stream = cat_with_options(
        vec![Item::from("ok"), Item::from(Deferred::rejected("fail"))],
        options,
    );

    assert_eq!(
        events(stream).await,
        vec!["ok", "error: while concatenating: fail"]
    );
}

#[tokio::test]
async fn test_collect_bytes_returns_the_error() {
    let stream = cat(vec![Item::from("partial"), Item::from(Deferred::rejected("boom"))]);
    let err = stream.collect_bytes().await.unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn test_drained_waits_for_items_after_error() {
    let released = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&released);
    let (slow_tx, slow) = AsyncStream::<CatResult<Bytes>>::channel();
    let tail = LiveSource::new(slow).on_close(move || flag.store(true, Ordering::SeqCst));

    let mut stream = cat(vec![Item::from(Deferred::rejected("fail")), Item::from(tail)]);

    let mut failures = 0;
    while let Some(event) = stream.next().await {
        assert_eq!(event.unwrap_err().to_string(), "fail");
        failures += 1;
    }
    assert_eq!(failures, 1);

    // The output ended at the error; the trailing source is still open.
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        slow_tx.send(Ok(Bytes::from("discarded"))).unwrap();
    });

    stream.drained().await;
    assert!(released.load(Ordering::SeqCst));
}
