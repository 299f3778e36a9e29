//! Stream concatenation module
//!
//! Turns an ordered list of buffers, deferred values and live sources into a
//! single byte stream.

pub mod engine;
pub mod error;
pub mod error_box;
pub mod item;
pub mod options;
pub mod sink;

// Re-export engine types
pub use engine::Engine;

// Re-export error types
pub use error::{CatError, CatResult};
pub use error_box::{ErrorBox, ErrorListener};

// Re-export item and sink types
pub use item::{Deferred, Item, LiveSource};
pub use options::{CatOptions, DEFAULT_READ_CHUNK_SIZE, ErrorMapper};
pub use sink::{CatStream, OutputSink};

/// Concatenate `items` with default options.
///
/// Returns immediately; the items are drained on a spawned task. Must be
/// called from within a Tokio runtime.
pub fn cat<I>(items: I) -> CatStream
where
    I: IntoIterator,
    I::Item: Into<Item>,
{
    cat_with_options(items, CatOptions::default())
}

/// Concatenate `items` using `options`.
pub fn cat_with_options<I>(items: I, options: CatOptions) -> CatStream
where
    I: IntoIterator,
    I::Item: Into<Item>,
{
    let (sink, mut stream) = OutputSink::new();
    let engine = Engine::new(items.into_iter().map(Into::into), sink, options);
    stream.attach_engine(engine::spawn(engine));
    stream
}
