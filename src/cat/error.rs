//! Concatenation error types

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced on the error channel of a [`CatStream`](crate::CatStream).
///
/// Cloning is cheap (Arc clone), so one error can be handed to every
/// registered error listener.
#[derive(Debug, Clone, Error)]
pub enum CatError {
    /// Error raised by an item (deferred rejection or live source failure)
    #[error("{0}")]
    Source(Arc<dyn StdError + Send + Sync>),

    /// I/O failure while reading a reader-backed source
    #[error("{0}")]
    Io(Arc<io::Error>),

    /// Item of an unsupported type
    #[error(
        "Invalid stream component '{type_name}', must be: Readable source, Buffer, or Promise"
    )]
    InvalidItem { type_name: String },

    /// The producer behind a deferred value went away without resolving it
    #[error("deferred value dropped before resolving")]
    DeferredDropped,

    /// Error annotated with caller supplied context
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CatError>,
    },

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

/// Convenience result alias for concatenation operations
pub type CatResult<T> = Result<T, CatError>;

impl CatError {
    /// Wrap any error raised by an item.
    pub fn from_source<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CatError::Source(Arc::new(error))
    }

    /// Prefix this error with `context`.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        CatError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<io::Error> for CatError {
    fn from(e: io::Error) -> Self {
        CatError::Io(Arc::new(e))
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for CatError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        CatError::DeferredDropped
    }
}

// Convenience conversions
impl From<String> for CatError {
    fn from(s: String) -> Self {
        CatError::Custom(s)
    }
}

impl From<&str> for CatError {
    fn from(s: &str) -> Self {
        CatError::Custom(s.to_string())
    }
}
