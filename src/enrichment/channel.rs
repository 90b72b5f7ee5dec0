use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{EnrichmentMessage, EnrichmentQueue, QueueError};

/// In-process queue backed by a bounded tokio channel.
#[derive(Clone)]
pub struct ChannelQueue {
    sender: mpsc::Sender<EnrichmentMessage>,
}

/// Create a queue and the receiver a [`KeywordWorker`](super::KeywordWorker) drains.
pub fn channel(capacity: usize) -> (ChannelQueue, mpsc::Receiver<EnrichmentMessage>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelQueue { sender }, receiver)
}

#[async_trait]
impl EnrichmentQueue for ChannelQueue {
    async fn send(&self, message: EnrichmentMessage) -> Result<(), QueueError> {
        // Never wait on a full channel: the outbox keeps the message for the relay.
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}
