//! Configuration for concatenation

use crate::cat::error::CatError;
use crate::cat::item::LiveSource;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// Maps an error right before it is emitted on the output stream.
pub type ErrorMapper = Arc<dyn Fn(CatError) -> CatError + Send + Sync>;

/// Default chunk size for reader-backed live sources (64 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for a concatenation
#[derive(Clone)]
pub struct CatOptions {
    pub error_mapper: ErrorMapper,
    pub read_chunk_size: usize,
}

impl CatOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function applied to every error before emission
    #[must_use]
    pub fn error_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(CatError) -> CatError + Send + Sync + 'static,
    {
        self.error_mapper = Arc::new(mapper);
        self
    }

    /// Set the chunk size used by reader-backed sources (minimum 1)
    #[must_use]
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Start reading `reader` as a live source using the configured chunk size.
    pub fn reader<R>(&self, reader: R) -> LiveSource
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        LiveSource::from_reader(reader, self.read_chunk_size)
    }

    pub(crate) fn map_error(&self, error: CatError) -> CatError {
        (self.error_mapper)(error)
    }
}

impl Default for CatOptions {
    fn default() -> Self {
        Self {
            error_mapper: Arc::new(|e| e),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl std::fmt::Debug for CatOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatOptions")
            .field("read_chunk_size", &self.read_chunk_size)
            .finish_non_exhaustive()
    }
}
