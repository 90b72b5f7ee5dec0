use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use super::EnrichmentMessage;
use crate::generator::{GeneratorError, TextGenerator};
use crate::service::{BookService, ServiceError};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Keyword generation failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("Keyword write-back failed: {0}")]
    Service(#[from] ServiceError),
}

/// Consumes enrichment messages and appends the generated keywords to the pick.
pub struct KeywordWorker {
    service: Arc<BookService>,
    generator: Arc<dyn TextGenerator>,
    receiver: mpsc::Receiver<EnrichmentMessage>,
}

impl KeywordWorker {
    pub fn new(
        service: Arc<BookService>,
        generator: Arc<dyn TextGenerator>,
        receiver: mpsc::Receiver<EnrichmentMessage>,
    ) -> Self {
        Self {
            service,
            generator,
            receiver,
        }
    }

    /// Drain the queue until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            let pick_id = message.pick_id;
            match self.process(message).await {
                Ok(added) => {
                    tracing::debug!(pick_id, added, "Stored pick keywords");
                }
                Err(WorkerError::Service(ServiceError::NotFound(_))) => {
                    tracing::debug!(pick_id, "Pick gone before enrichment, dropping message");
                }
                Err(e) => {
                    tracing::error!(pick_id, error = %e, "Failed to enrich pick");
                }
            }
        }
        tracing::info!("Enrichment queue closed, keyword worker stopping");
    }

    /// Generate and store keywords for one message. Returns how many new rows were written.
    pub async fn process(&self, message: EnrichmentMessage) -> Result<usize, WorkerError> {
        let keywords = self.generator.keywords(&message.text).await?;
        let added = self
            .service
            .add_pick_keywords(message.user_id, message.pick_id, &keywords)
            .await?;
        Ok(added)
    }
}

/// Periodically relays outbox rows whose immediate relay failed. It can race
/// the post-commit relay and resend a row; workers tolerate duplicates.
pub struct OutboxRelay {
    service: Arc<BookService>,
    interval: Duration,
}

impl OutboxRelay {
    pub fn new(service: Arc<BookService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.service.relay_enrichment_outbox().await {
                Ok(0) => {}
                Ok(relayed) => tracing::debug!(relayed, "Relayed pending enrichment messages"),
                Err(e) => tracing::warn!(error = %e, "Outbox relay failed"),
            }
        }
    }
}
