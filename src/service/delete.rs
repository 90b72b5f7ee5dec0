use tracing::info;
use uuid::Uuid;

use super::types::DeleteOutcome;
use super::{BookService, ServiceError};
use crate::storage::{books, picks};

impl BookService {
    /// Delete a pick and close the gap it leaves in the book's indexes.
    /// Deleting the last pick deletes the whole book instead.
    pub async fn delete_pick(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        pick_id: Uuid,
    ) -> Result<DeleteOutcome, ServiceError> {
        let outcome = self.db.write(|tx| -> Result<DeleteOutcome, ServiceError> {
            let book = books::owned_book(&*tx, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            let pick = picks::book_pick_by_guid(&*tx, book.id, pick_id)?
                .ok_or(ServiceError::NotFound("Pick"))?;

            if picks::count_book_picks(&*tx, book.id)? <= 1 {
                tx.delete_book(&book)?;
                return Ok(DeleteOutcome { is_last_pick: true });
            }

            tx.delete_pick(&pick)?;
            tx.shift_picks_down(book.id, pick.index)?;
            Ok(DeleteOutcome {
                is_last_pick: false,
            })
        })?;

        info!(%book_id, %pick_id, is_last_pick = outcome.is_last_pick, "Pick deleted");
        Ok(outcome)
    }

    /// Delete a book with its picks, keywords and topic associations, then
    /// drop the user's topics left without books.
    pub async fn delete_book(&self, user_id: Uuid, book_id: Uuid) -> Result<(), ServiceError> {
        let dropped = self.db.write(|tx| -> Result<Vec<String>, ServiceError> {
            let book = books::owned_book(&*tx, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            tx.delete_book(&book)?;
            Ok(tx.delete_orphan_topics(user_id)?)
        })?;

        info!(%book_id, dropped_topics = dropped.len(), "Book deleted");
        Ok(())
    }
}
