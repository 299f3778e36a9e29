//! Runtime module
//!
//! Provides async task execution and streaming primitives.

pub mod async_task;

use std::future::Future;

// Re-export async task types
pub use async_task::{AsyncStream, AsyncTask};

/// Spawn an async task whose result is collected through an [`AsyncTask`].
///
/// Convenience wrapper around `AsyncTask::spawn_async`.
#[inline]
pub fn spawn_task<T, F>(work: F) -> AsyncTask<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    AsyncTask::spawn_async(work)
}
