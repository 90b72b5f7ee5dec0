use super::db::DatabaseError;
use super::models::EnrichmentMessage;
use super::tables::OUTBOX_SEQUENCE;
use super::view::{store, TableView, WriteView};
use redb::ReadableTable;

/// Pending enrichment messages, oldest first, up to `limit`
pub fn pending_enrichment(
    view: &impl TableView,
    limit: usize,
) -> Result<Vec<(u64, EnrichmentMessage)>, DatabaseError> {
    let mut pending = Vec::new();
    for entry in view.outbox().iter()?.take(limit) {
        let (id, data) = entry?;
        let message: EnrichmentMessage = rmp_serde::from_slice(data.value())?;
        pending.push((id.value(), message));
    }
    Ok(pending)
}

impl WriteView<'_> {
    /// Record an enrichment message in the outbox. It commits or rolls back
    /// together with the rest of the transaction.
    pub fn enqueue_enrichment(&mut self, message: &EnrichmentMessage) -> Result<u64, DatabaseError> {
        let id = self.next_id(OUTBOX_SEQUENCE)?;
        store(&mut self.outbox, id, message)?;
        Ok(id)
    }

    /// Remove a relayed message from the outbox
    pub fn ack_enrichment(&mut self, id: u64) -> Result<bool, DatabaseError> {
        Ok(self.outbox.remove(id)?.is_some())
    }
}
