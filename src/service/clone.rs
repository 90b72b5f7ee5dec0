use tracing::info;
use uuid::Uuid;

use super::read::assemble_book;
use super::tagging::tag_book;
use super::types::{BookView, TopicInput};
use super::{BookService, ServiceError};
use crate::storage::picks::NewPick;
use crate::storage::topics::ConflictPolicy;
use crate::storage::{books, keywords, picks, topics};

impl BookService {
    /// Deep-copy any book into the caller's library: new identities, same
    /// title, author, pick contents and indexes, topics and keywords.
    pub async fn save_book(&self, user_id: Uuid, source_id: Uuid) -> Result<BookView, ServiceError> {
        let view = self.db.write(|tx| -> Result<BookView, ServiceError> {
            let source =
                books::book_by_guid(&*tx, source_id)?.ok_or(ServiceError::NotFound("Book"))?;
            let copy = tx.insert_book(user_id, &source.title, &source.author)?;

            for pick in picks::book_picks(&*tx, source.id)? {
                let copied = tx.insert_pick(
                    &copy,
                    user_id,
                    NewPick {
                        content: &pick.content,
                        content_text: &pick.content_text,
                        title: pick.title.as_deref(),
                    },
                    pick.index,
                )?;
                for keyword in keywords::pick_keywords(&*tx, pick.id)? {
                    tx.insert_keyword(copied.id, user_id, &keyword.keyword)?;
                }
            }

            let labels: Vec<TopicInput> = topics::book_topics(&*tx, source.id)?
                .into_iter()
                .map(|topic| TopicInput::with_color(topic.label, topic.color))
                .collect();
            tag_book(
                tx,
                user_id,
                copy.id,
                &labels,
                ConflictPolicy::Keep,
                &self.config.palette,
            )?;

            Ok(assemble_book(&*tx, &copy, self.config.recent_picks)?)
        })?;

        info!(%source_id, book_id = %view.id, picks = view.picks_count, "Book saved");
        Ok(view)
    }
}
