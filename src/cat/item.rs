//! Input items accepted by the concatenation engine.

use crate::cat::error::{CatError, CatResult};
use crate::cat::sink::CatStream;
use crate::runtime::{AsyncStream, AsyncTask, spawn_task};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::any::{Any, type_name};
use std::future::Future;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Type alias for the boxed future behind a deferred value.
type ItemFuture = Pin<Box<dyn Future<Output = CatResult<Item>> + Send>>;

/// Type alias for the boxed chunk stream behind a live source.
type ChunkStream = Pin<Box<dyn Stream<Item = CatResult<Bytes>> + Send>>;

/// Callback fired once a live source has been released.
type CloseHook = Box<dyn FnOnce() + Send>;

/// One element of the ordered input list.
pub enum Item {
    /// Bytes available right away.
    Buffer(Bytes),
    /// A value that eventually resolves to another item, or fails.
    Deferred(Deferred),
    /// A source pushing chunks until it ends or fails.
    Live(LiveSource),
    /// A value of an unsupported type, rejected at the input boundary.
    ///
    /// It keeps its place in the list and fails when the engine reaches it.
    Invalid { type_name: &'static str },
}

impl Item {
    /// Convert an arbitrary value into an item.
    ///
    /// Accepts anything with an `Into<Item>` conversion defined in this
    /// module. Other types become [`Item::Invalid`] carrying the type name.
    pub fn from_any<T>(value: T) -> Item
    where
        T: Any + Send,
    {
        fn take<U>(boxed: Box<dyn Any + Send>) -> Result<Item, Box<dyn Any + Send>>
        where
            U: Any + Into<Item>,
        {
            boxed.downcast::<U>().map(|value| (*value).into())
        }

        let boxed: Box<dyn Any + Send> = Box::new(value);
        take::<Item>(boxed)
            .or_else(take::<Bytes>)
            .or_else(take::<Vec<u8>>)
            .or_else(take::<&'static [u8]>)
            .or_else(take::<&'static str>)
            .or_else(take::<String>)
            .or_else(take::<Deferred>)
            .or_else(take::<LiveSource>)
            .or_else(take::<CatStream>)
            .or_else(take::<AsyncTask<CatResult<Item>>>)
            .or_else(take::<AsyncStream<CatResult<Bytes>>>)
            .unwrap_or_else(|_| Item::Invalid {
                type_name: type_name::<T>(),
            })
    }

    /// Short variant name, used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Buffer(_) => "buffer",
            Item::Deferred(_) => "deferred",
            Item::Live(_) => "live",
            Item::Invalid { .. } => "invalid",
        }
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Buffer(bytes) => f.debug_tuple("Buffer").field(bytes).finish(),
            Item::Deferred(_) => f.write_str("Deferred(..)"),
            Item::Live(_) => f.write_str("Live(..)"),
            Item::Invalid { type_name } => f
                .debug_struct("Invalid")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

impl From<Bytes> for Item {
    fn from(bytes: Bytes) -> Self {
        Item::Buffer(bytes)
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Buffer(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Item {
    fn from(bytes: &'static [u8]) -> Self {
        Item::Buffer(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for Item {
    fn from(s: &'static str) -> Self {
        Item::Buffer(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Buffer(Bytes::from(s))
    }
}

impl From<Deferred> for Item {
    fn from(deferred: Deferred) -> Self {
        Item::Deferred(deferred)
    }
}

impl<T> From<AsyncTask<CatResult<T>>> for Item
where
    T: Into<Item> + Send + 'static,
{
    fn from(task: AsyncTask<CatResult<T>>) -> Self {
        Item::Deferred(task.into())
    }
}

impl From<LiveSource> for Item {
    fn from(source: LiveSource) -> Self {
        Item::Live(source)
    }
}

impl From<CatStream> for Item {
    fn from(stream: CatStream) -> Self {
        Item::Live(LiveSource::new(stream))
    }
}

impl From<AsyncStream<CatResult<Bytes>>> for Item {
    fn from(stream: AsyncStream<CatResult<Bytes>>) -> Self {
        Item::Live(LiveSource::new(stream))
    }
}

// ============================================================================
// Deferred
// ============================================================================

/// A value that is not known yet: it resolves to another [`Item`] or fails.
///
/// Resolution may nest: a deferred value can resolve to another deferred value.
pub struct Deferred {
    future: ItemFuture,
}

impl Deferred {
    /// Wrap a future. It is only polled once the engine reaches this item.
    pub fn new<F, T>(future: F) -> Self
    where
        F: Future<Output = CatResult<T>> + Send + 'static,
        T: Into<Item> + Send + 'static,
    {
        Self {
            future: Box::pin(async move { future.await.map(Into::<Item>::into) }),
        }
    }

    /// Run `future` on its own task right away and resolve to its result.
    pub fn spawn<F, T>(future: F) -> Self
    where
        F: Future<Output = CatResult<T>> + Send + 'static,
        T: Into<Item> + Send + 'static,
    {
        spawn_task(future).into()
    }

    /// Already resolved to `item`.
    pub fn resolved(item: impl Into<Item>) -> Self {
        let item = item.into();
        Self {
            future: Box::pin(async move { Ok::<_, CatError>(item) }),
        }
    }

    /// Already rejected with `error`.
    pub fn rejected(error: impl Into<CatError>) -> Self {
        let error = error.into();
        Self {
            future: Box::pin(async move { Err::<Item, _>(error) }),
        }
    }

    pub(crate) async fn resolve(self) -> CatResult<Item> {
        self.future.await
    }
}

impl<T> From<AsyncTask<CatResult<T>>> for Deferred
where
    T: Into<Item> + Send + 'static,
{
    fn from(task: AsyncTask<CatResult<T>>) -> Self {
        Self::new(async move { task.await? })
    }
}

// ============================================================================
// LiveSource
// ============================================================================

/// A source that pushes byte chunks, then either ends or fails.
///
/// `Ok(chunk)` is a data signal, the end of the stream is the end signal and
/// `Err` is the error signal. Nothing is pulled after the first error.
pub struct LiveSource {
    stream: ChunkStream,
    on_close: Option<CloseHook>,
}

impl LiveSource {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = CatResult<Bytes>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            on_close: None,
        }
    }

    /// Source yielding the given chunks, then ending.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator + 'static,
        I::Item: Into<Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(tokio_stream::iter(
            chunks.into_iter().map(|chunk| Ok::<Bytes, CatError>(chunk.into())),
        ))
    }

    /// Source reading `reader` on a spawned task, starting immediately.
    ///
    /// Chunks and a read failure queue up until the engine gets to this
    /// source, so an early failure is held rather than lost.
    pub fn from_reader<R>(reader: R, chunk_size: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let chunks = AsyncStream::<std::io::Result<Bytes>>::from_reader(reader, chunk_size);
        Self::new(chunks.map(|r| r.map_err(CatError::from)))
    }

    /// Prefix every error this source raises with `context`.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        let stream = std::mem::replace(&mut self.stream, Box::pin(futures::stream::empty()));
        self.stream = Box::pin(stream.map(move |r| r.map_err(|e| e.context(context.clone()))));
        self
    }

    /// Run `hook` once the source is released, after it ended, failed, or
    /// was drained following an earlier error.
    #[must_use]
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub(crate) async fn next_chunk(&mut self) -> Option<CatResult<Bytes>> {
        self.stream.next().await
    }
}

impl Drop for LiveSource {
    fn drop(&mut self) {
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}
