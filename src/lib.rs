//! `stream_cat` - sequential concatenation of heterogeneous byte sources
//!
//! Given an ordered list of in-memory buffers, deferred values and live byte
//! sources, produces one byte stream holding each input's bytes in list
//! order. The first error in list order is surfaced exactly once, and inputs
//! after a failure are still drained so their resources get released.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stream_cat::{Deferred, Item, LiveSource, cat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stream_cat::CatError> {
//!     let output = cat(vec![
//!         Item::from("head "),
//!         LiveSource::from_chunks(["live ", "chunks "]).into(),
//!         Deferred::resolved("tail").into(),
//!     ]);
//!
//!     let bytes = output.collect_bytes().await?;
//!     assert_eq!(&bytes[..], b"head live chunks tail");
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cat;
pub mod runtime;

// Re-export runtime types
pub use runtime::{AsyncStream, AsyncTask};

// Re-export entry points
pub use cat::{cat, cat_with_options};

// Re-export concatenation types
pub use cat::{
    CatError, CatOptions, CatResult, CatStream, Deferred, Engine, ErrorBox, Item, LiveSource,
    OutputSink,
};
