//! Tests for async task runtime primitives.

use bytes::Bytes;
use futures::StreamExt;
use stream_cat::runtime::{AsyncStream, AsyncTask, spawn_task};

#[tokio::test]
async fn test_async_task_spawn_async() {
    let task = AsyncTask::spawn_async(async { 42 });
    let result = task.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_spawn_task() {
    let task = spawn_task(async { "done" });
    assert_eq!(task.await.unwrap(), "done");
}

#[tokio::test]
async fn test_async_task_pending_dropped_sender() {
    let (tx, task) = AsyncTask::<i32>::pending();
    drop(tx);
    assert!(task.await.is_err());
}

#[tokio::test]
async fn test_async_stream_channel() {
    let (tx, mut stream) = AsyncStream::channel();
    tx.send("a").unwrap();
    drop(tx);

    assert_eq!(stream.next().await, Some("a"));
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn test_async_stream_from_reader_chunks() {
    let reader: &'static [u8] = b"abcdefg";
    let stream = AsyncStream::<std::io::Result<Bytes>>::from_reader(reader, 3);

    let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(chunks, vec![Bytes::from("abc"), Bytes::from("def"), Bytes::from("g")]);
}
