//! Output side of a concatenation.
//!
//! [`OutputSink`] is the engine's write end. [`CatStream`] is what callers
//! get back: the ordered chunks followed by at most one error.

use crate::cat::error::{CatError, CatResult};
use crate::cat::error_box::ErrorBox;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::{trace, warn};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Append-only write end owned by the engine.
///
/// Ends exactly once: either normally or right after an error was recorded.
/// Writes and ends after that are silently ignored.
pub struct OutputSink {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
    errors: ErrorBox,
}

impl OutputSink {
    /// Create a sink together with the stream reading from it.
    #[must_use]
    pub fn new() -> (Self, CatStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let errors = ErrorBox::new();
        let sink = Self {
            tx: Some(tx),
            errors: errors.clone(),
        };
        let stream = CatStream {
            rx,
            errors,
            done: false,
            engine: None,
        };
        (sink, stream)
    }

    #[inline]
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.tx.is_none()
    }

    /// Append `chunk`. Returns `false` if it was dropped.
    ///
    /// A chunk is dropped when the sink has ended or the reader went away.
    pub fn write(&mut self, chunk: Bytes) -> bool {
        let Some(tx) = &self.tx else {
            trace!("sink ended, dropping {} bytes", chunk.len());
            return false;
        };
        if tx.send(chunk).is_err() {
            trace!("output stream dropped, discarding chunk");
            return false;
        }
        true
    }

    /// Put `error` on the error channel, then end the sink.
    ///
    /// Returns `false` without touching anything if the sink already ended.
    pub fn fail(&mut self, error: CatError) -> bool {
        if self.is_ended() {
            return false;
        }
        self.errors.record(error);
        self.end();
        true
    }

    /// End the sink. Idempotent.
    pub fn end(&mut self) {
        self.tx.take();
    }
}

/// The concatenated output.
///
/// Yields every chunk in input order. If an item failed, the error comes last
/// as an `Err`, unless it was already handed to an [`on_error`] listener.
///
/// **Warning:** once a listener registered with [`on_error`] has taken the
/// error, the stream itself ends with plain `None`, exactly like a successful
/// concatenation. A consumer that only reads the stream cannot tell the two
/// apart, so either read errors from the stream or from a listener, not both.
///
/// The stream ends as soon as the output ends, which after an error may be
/// before the remaining inputs are drained. Use [`drained`] to wait for that.
///
/// [`on_error`]: CatStream::on_error
/// [`drained`]: CatStream::drained
pub struct CatStream {
    rx: mpsc::UnboundedReceiver<Bytes>,
    errors: ErrorBox,
    done: bool,
    engine: Option<JoinHandle<()>>,
}

impl CatStream {
    /// Register an error listener.
    ///
    /// The listener sees the error exactly once, whether it failed before or
    /// after this call. Only the first listener gets an error that was
    /// buffered while nobody listened.
    pub fn on_error<F>(&self, listener: F)
    where
        F: FnOnce(CatError) + Send + 'static,
    {
        self.errors.subscribe(Box::new(listener));
    }

    pub(crate) fn attach_engine(&mut self, engine: JoinHandle<()>) {
        self.engine = Some(engine);
    }

    /// Wait until every input has been drained, including the inputs after
    /// an error. Unread chunks are discarded.
    pub async fn drained(mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        drop(self);
        if let Err(e) = engine.await {
            warn!("concatenation task failed: {e}");
        }
    }

    /// Read the whole stream into one buffer.
    pub async fn collect_bytes(mut self) -> CatResult<Bytes> {
        let mut out = BytesMut::new();
        while let Some(chunk) = self.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out.freeze())
    }
}

impl Stream for CatStream {
    type Item = CatResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(chunk)) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(None) => {
                // The sink ended; an error, if any, was recorded before that.
                self.done = true;
                Poll::Ready(self.errors.take().map(Err))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl std::fmt::Debug for CatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatStream")
            .field("errors", &self.errors)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
