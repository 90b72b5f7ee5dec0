//! Asynchronous keyword enrichment.
//!
//! Mutations that change pick text record an [`EnrichmentMessage`] in the
//! outbox table inside their own transaction. After commit the message is
//! relayed to an [`EnrichmentQueue`]; a [`KeywordWorker`] consumes the queue,
//! asks the [`TextGenerator`](crate::generator::TextGenerator) for keywords
//! and writes them back. Delivery is at-least-once.

mod channel;
mod worker;

pub use channel::{channel, ChannelQueue};
pub use worker::{KeywordWorker, OutboxRelay, WorkerError};

pub use crate::storage::models::EnrichmentMessage;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue closed")]
    Closed,
    #[error("Queue full")]
    Full,
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over the message channel feeding the keyword worker.
#[async_trait]
pub trait EnrichmentQueue: Send + Sync {
    async fn send(&self, message: EnrichmentMessage) -> Result<(), QueueError>;
}
