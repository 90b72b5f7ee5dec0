use tracing::{debug, warn};
use uuid::Uuid;

use super::{BookService, Pending, ServiceError};
use crate::storage::{outbox, picks, DatabaseError};

impl BookService {
    /// Store generated keywords for a pick. Keywords the pick already has are
    /// skipped, so a redelivered message changes nothing. Returns the number
    /// of rows added.
    pub async fn add_pick_keywords(
        &self,
        user_id: Uuid,
        pick_id: u64,
        keywords: &[String],
    ) -> Result<usize, ServiceError> {
        self.db.write(|tx| -> Result<usize, ServiceError> {
            let pick = picks::pick_by_id(&*tx, pick_id)?
                .filter(|pick| pick.user_id == user_id)
                .ok_or(ServiceError::NotFound("Pick"))?;
            Ok(tx.append_keywords(pick.id, user_id, keywords)?.len())
        })
    }

    /// Push every pending outbox entry (oldest first, one batch) to the
    /// enrichment queue. Returns how many were delivered.
    pub async fn relay_enrichment_outbox(&self) -> Result<usize, ServiceError> {
        let pending = self
            .db
            .read(|view| outbox::pending_enrichment(view, self.config.relay_batch))?;
        Ok(self.relay(pending).await)
    }

    /// Send committed outbox entries and clear the delivered ones. Failures are
    /// left in the outbox for the next sweep.
    ///
    /// A sweep may read an entry that the post-commit relay is still sending,
    /// so one message can reach the queue twice. Delivery is at-least-once and
    /// [`BookService::add_pick_keywords`] skips keywords already stored; the
    /// cost of a duplicate is one extra generator call.
    pub(super) async fn relay(&self, pending: Pending) -> usize {
        if pending.is_empty() {
            return 0;
        }

        let mut delivered = Vec::with_capacity(pending.len());
        for (id, message) in pending {
            let pick_id = message.pick_id;
            match self.queue.send(message).await {
                Ok(()) => delivered.push(id),
                Err(e) => {
                    warn!(outbox_id = id, pick_id, error = %e, "Enrichment relay deferred");
                }
            }
        }

        let acked = self.db.write(|tx| -> Result<usize, DatabaseError> {
            let mut acked = 0;
            for id in &delivered {
                if tx.ack_enrichment(*id)? {
                    acked += 1;
                }
            }
            Ok(acked)
        });
        if let Err(e) = acked {
            warn!(error = %e, "Failed to clear relayed outbox entries");
        }

        debug!(delivered = delivered.len(), "Relayed enrichment messages");
        delivered.len()
    }
}
