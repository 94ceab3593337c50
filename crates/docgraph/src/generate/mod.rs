//! Streaming generation boundary.
//!
//! Language-model clients live outside this crate. They implement
//! [`Generator`] and push text fragments into a [`FragmentSink`]; the
//! consumer reads them from a [`FragmentStream`] in production order.
//!
//! ```text
//!   producer task                       consumer
//!   ─────────────                       ────────
//!   generate(prompts, sink)
//!     sink.emit("Re") ──── channel ───→ stream.next()
//!     sink.emit("turns") ─────────────→ stream.next()
//!     ...                               drop / finish()
//!     sink.emit(..) == false  ←──────── (receiver closed)
//!     return early
//! ```
//!
//! A consumer that stops reading is observable: `emit` returns `false` once
//! the receiving side is gone and producers are expected to stop.

mod prompts;

pub use prompts::PromptPair;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A text generator driven by a system/user prompt pair.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce fragments into `sink` until done or until `sink.emit`
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// [`Error::Generation`] when the backend fails.
    async fn generate(&self, prompts: &PromptPair, sink: &FragmentSink) -> Result<()>;
}

/// Producer side of a fragment stream.
#[derive(Debug)]
pub struct FragmentSink {
    sender: mpsc::Sender<String>,
}

impl FragmentSink {
    /// Send one fragment, waiting for buffer space.
    ///
    /// Returns `false` without sending if the consumer has gone away.
    pub async fn emit(&self, fragment: impl Into<String> + Send) -> bool {
        if self.sender.is_closed() {
            trace!("Consumer closed; dropping fragment");
            return false;
        }
        self.sender.send(fragment.into()).await.is_ok()
    }

    /// Whether the consumer has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer side of a fragment stream.
#[derive(Debug)]
pub struct FragmentStream {
    receiver: mpsc::Receiver<String>,
    producer: JoinHandle<Result<()>>,
}

impl FragmentStream {
    /// Next fragment, or `None` once the producer has finished.
    pub async fn next(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Read every remaining fragment and join them.
    ///
    /// # Errors
    ///
    /// Returns the producer's error, if any.
    pub async fn collect(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.receiver.recv().await {
            text.push_str(&fragment);
        }
        self.finish().await?;
        Ok(text)
    }

    /// Stop consuming and wait for the producer to return.
    ///
    /// Dropping the receiver first lets a producer blocked on `emit` observe
    /// the closed stream.
    ///
    /// # Errors
    ///
    /// Returns the producer's error, or [`Error::Generation`] if it panicked.
    pub async fn finish(self) -> Result<()> {
        let Self { receiver, producer } = self;
        drop(receiver);
        match producer.await {
            Ok(result) => result,
            Err(e) => Err(Error::Generation(format!("generator task failed: {e}"))),
        }
    }
}

/// Start `generator` on the tokio runtime and return the stream it feeds.
///
/// `capacity` bounds how many fragments may wait unread (minimum 1).
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
#[must_use]
pub fn stream_generation(
    generator: Arc<dyn Generator>,
    prompts: PromptPair,
    capacity: usize,
) -> FragmentStream {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let producer = tokio::spawn(async move {
        let sink = FragmentSink { sender };
        let result = generator.generate(&prompts, &sink).await;
        debug!(ok = result.is_ok(), closed = sink.is_closed(), "Generator finished");
        result
    });
    FragmentStream { receiver, producer }
}
