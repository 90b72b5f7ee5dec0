use tracing::{info, warn};
use uuid::Uuid;

use super::read::assemble_book;
use super::tagging::tag_book;
use super::types::{BookView, CreateOutcome, CreatePickParams, PickInput, PickView, TopicInput};
use super::{BookService, Pending, ServiceError};
use crate::storage::models::EnrichmentMessage;
use crate::storage::picks::{self, NewPick};
use crate::storage::topics::ConflictPolicy;
use crate::storage::{books, DatabaseError, WriteView};

/// Reject a blank pick field
pub(super) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("pick {field} is required")));
    }
    Ok(())
}

fn validate_pick(pick: &PickInput) -> Result<(), ServiceError> {
    require_text("content", &pick.content)?;
    require_text("content_text", &pick.content_text)
}

fn new_pick(pick: &PickInput) -> NewPick<'_> {
    NewPick {
        content: &pick.content,
        content_text: &pick.content_text,
        title: pick.title.as_deref().filter(|t| !t.trim().is_empty()),
    }
}

/// Write the enrichment request for a freshly stored pick to the outbox
fn request_keywords(
    tx: &mut WriteView<'_>,
    pending: &mut Pending,
    pick_id: u64,
    user_id: Uuid,
    text: &str,
) -> Result<(), DatabaseError> {
    let message = EnrichmentMessage {
        pick_id,
        user_id,
        text: text.to_string(),
    };
    let id = tx.enqueue_enrichment(&message)?;
    pending.push((id, message));
    Ok(())
}

impl BookService {
    /// Create a pick. Without a book reference a new book is created around
    /// it; otherwise the pick is added to the user's existing book, either
    /// appended or inserted at an explicit index.
    pub async fn create_pick(
        &self,
        user_id: Uuid,
        params: CreatePickParams,
    ) -> Result<CreateOutcome, ServiceError> {
        validate_pick(&params.pick)?;
        match params.book_id {
            None => self.create_book(user_id, params).await.map(CreateOutcome::Book),
            Some(book_id) => self
                .add_pick(user_id, book_id, params.pick)
                .await
                .map(CreateOutcome::Pick),
        }
    }

    async fn create_book(
        &self,
        user_id: Uuid,
        params: CreatePickParams,
    ) -> Result<BookView, ServiceError> {
        let title = params.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(ServiceError::validation("book title is required"));
        }

        let author = match params.author.as_deref().map(str::trim) {
            Some(author) if !author.is_empty() => author.to_string(),
            _ => self.resolve_author(title).await,
        };
        let labels: Vec<TopicInput> = self
            .generator
            .topics(&params.pick.content_text)
            .await?
            .into_iter()
            .map(TopicInput::new)
            .collect();

        let mut pending = Pending::new();
        let view = self.db.write(|tx| -> Result<BookView, ServiceError> {
            let book = tx.insert_book(user_id, title, &author)?;
            let pick = tx.insert_pick(&book, user_id, new_pick(&params.pick), 0)?;
            request_keywords(tx, &mut pending, pick.id, user_id, &pick.content_text)?;
            tag_book(
                tx,
                user_id,
                book.id,
                &labels,
                ConflictPolicy::Keep,
                &self.config.palette,
            )?;
            Ok(assemble_book(&*tx, &book, self.config.recent_picks)?)
        })?;

        info!(book_id = %view.id, topics = view.topics.len(), "Book created");
        self.relay(pending).await;
        Ok(view)
    }

    async fn add_pick(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        input: PickInput,
    ) -> Result<PickView, ServiceError> {
        let mut pending = Pending::new();
        let view = self.db.write(|tx| -> Result<PickView, ServiceError> {
            let mut book = books::owned_book(&*tx, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            let count = picks::count_book_picks(&*tx, book.id)? as u32;
            let index = match input.index {
                None => count,
                Some(index) if index <= count => index,
                Some(index) => {
                    return Err(ServiceError::validation(format!(
                        "index {index} is past the end of a book with {count} picks"
                    )))
                }
            };

            if index < count {
                tx.shift_picks_up(book.id, index)?;
            }
            let pick = tx.insert_pick(&book, user_id, new_pick(&input), index)?;
            request_keywords(tx, &mut pending, pick.id, user_id, &pick.content_text)?;
            tx.touch_book(&mut book)?;
            Ok(PickView::from(&pick))
        })?;

        info!(book_id = %book_id, pick_id = %view.id, index = view.index, "Pick added");
        self.relay(pending).await;
        Ok(view)
    }

    /// Author for a new book. Lookup failures degrade to an empty author.
    async fn resolve_author(&self, title: &str) -> String {
        match self.lookup.lookup(title).await {
            Ok(author) => author,
            Err(e) => {
                warn!(title, error = %e, "Author lookup failed");
                String::new()
            }
        }
    }
}
