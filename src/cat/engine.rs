//! Sequential concatenation engine.
//!
//! Items are drained strictly one after another. The first error, in list
//! order, ends the sink; every later item is still drained so live sources
//! run to completion and release what they hold.

use crate::cat::error::CatError;
use crate::cat::item::{Item, LiveSource};
use crate::cat::options::CatOptions;
use crate::cat::sink::OutputSink;
use log::{debug, warn};
use std::collections::VecDeque;
use tokio::task::JoinHandle;

/// Drives one concatenation from its input list into its sink.
pub struct Engine {
    items: VecDeque<Item>,
    sink: OutputSink,
    options: CatOptions,
}

impl Engine {
    #[must_use]
    pub fn new<I>(items: I, sink: OutputSink, options: CatOptions) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        Self {
            items: items.into_iter().collect(),
            sink,
            options,
        }
    }

    /// Drain every item, then end the sink.
    pub async fn run(mut self) {
        debug!("concatenating {} items", self.items.len());

        while let Some(item) = self.items.pop_front() {
            debug!("draining {} item", item.kind());
            match item {
                Item::Buffer(bytes) => {
                    tokio::task::yield_now().await;
                    self.sink.write(bytes);
                }
                Item::Deferred(deferred) => match deferred.resolve().await {
                    // Drained next, in place of the deferred value.
                    Ok(resolved) => self.items.push_front(resolved),
                    Err(e) => self.handle_error(e),
                },
                Item::Live(source) => self.drain_live(source).await,
                Item::Invalid { type_name } => {
                    tokio::task::yield_now().await;
                    self.handle_error(CatError::InvalidItem {
                        type_name: type_name.to_string(),
                    });
                }
            }
        }

        self.sink.end();
        debug!("concatenation finished");
    }

    async fn drain_live(&mut self, mut source: LiveSource) {
        while let Some(next) = source.next_chunk().await {
            match next {
                Ok(chunk) => {
                    self.sink.write(chunk);
                }
                Err(e) => {
                    self.handle_error(e);
                    break;
                }
            }
        }
    }

    /// Surface `error` unless an earlier one already ended the sink.
    /// Draining carries on either way.
    fn handle_error(&mut self, error: CatError) {
        if self.sink.is_ended() {
            debug!("discarding error after sink ended: {error}");
            return;
        }
        let error = self.options.map_error(error);
        warn!("concatenation failed: {error}");
        self.sink.fail(error);
    }
}

/// Spawn an engine on the current Tokio runtime.
pub(crate) fn spawn(engine: Engine) -> JoinHandle<()> {
    tokio::spawn(engine.run())
}
