use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::create::require_text;
use super::similarity::change_percent;
use super::tagging::replace_book_topics;
use super::types::{BookPatch, PickOrder, PickPatch, PickView};
use super::{BookService, Pending, ServiceError};
use crate::storage::models::{BookRecord, EnrichmentMessage, Patch};
use crate::storage::{books, picks, WriteView};

/// Apply a reorder batch. The resulting indexes of the whole book must still
/// be exactly `0..count`; otherwise nothing is written.
fn reorder_picks(
    tx: &mut WriteView<'_>,
    book: &BookRecord,
    order: &[PickOrder],
) -> Result<usize, ServiceError> {
    let mut picks: HashMap<Uuid, _> = picks::book_picks(&*tx, book.id)?
        .into_iter()
        .map(|pick| (pick.guid, pick))
        .collect();

    let mut moved = HashSet::new();
    for entry in order {
        if !moved.insert(entry.guid) {
            return Err(ServiceError::validation(format!(
                "pick {} is listed more than once",
                entry.guid
            )));
        }
        let pick = picks
            .get_mut(&entry.guid)
            .ok_or(ServiceError::NotFound("Pick"))?;
        pick.index = entry.index;
    }

    let mut indexes: Vec<u32> = picks.values().map(|pick| pick.index).collect();
    indexes.sort_unstable();
    let contiguous = indexes
        .iter()
        .enumerate()
        .all(|(position, index)| *index as usize == position);
    if !contiguous {
        return Err(ServiceError::validation(
            "pick indexes must be a permutation of 0..count",
        ));
    }

    for guid in &moved {
        if let Some(pick) = picks.get(guid) {
            tx.put_pick(pick)?;
        }
    }
    Ok(moved.len())
}

impl BookService {
    /// Update a book's title, author, topic set and pick order in one
    /// transaction. Replacing topics drops the user's topics left unused.
    pub async fn edit_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        patch: BookPatch,
    ) -> Result<(), ServiceError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("book title cannot be empty"));
            }
        }
        if let Some(topics) = &patch.topics {
            if topics.iter().any(|topic| topic.label.trim().is_empty()) {
                return Err(ServiceError::validation("topic labels cannot be empty"));
            }
        }

        self.db.write(|tx| -> Result<(), ServiceError> {
            let mut book = books::owned_book(&*tx, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;

            if let Some(title) = patch.title {
                book.title = title.trim().to_string();
            }
            if let Some(author) = patch.author {
                book.author = author.trim().to_string();
            }
            if let Some(topics) = &patch.topics {
                let dropped =
                    replace_book_topics(tx, user_id, book.id, topics, &self.config.palette)?;
                debug!(%book_id, ?dropped, "Replaced book topics");
            }
            if let Some(order) = &patch.picks {
                let moved = reorder_picks(tx, &book, order)?;
                debug!(%book_id, moved, "Reordered picks");
            }

            tx.touch_book(&mut book)?;
            Ok(())
        })?;

        info!(%book_id, "Book edited");
        Ok(())
    }

    /// Update a pick's content, text and title. A text change of at least the
    /// configured share of the longer text requests fresh keywords.
    pub async fn edit_pick(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        pick_id: Uuid,
        patch: PickPatch,
    ) -> Result<PickView, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::validation("nothing to update"));
        }
        if let Some(content) = &patch.content {
            require_text("content", content)?;
        }
        if let Some(text) = &patch.content_text {
            require_text("content_text", text)?;
        }

        let mut pending = Pending::new();
        let view = self.db.write(|tx| -> Result<PickView, ServiceError> {
            let book = books::owned_book(&*tx, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            let mut pick = picks::book_pick_by_guid(&*tx, book.id, pick_id)?
                .ok_or(ServiceError::NotFound("Pick"))?;

            if let Some(text) = patch.content_text {
                let changed = change_percent(&pick.content_text, &text);
                if changed >= self.config.change_threshold_percent {
                    let message = EnrichmentMessage {
                        pick_id: pick.id,
                        user_id,
                        text: text.clone(),
                    };
                    let id = tx.enqueue_enrichment(&message)?;
                    pending.push((id, message));
                }
                pick.content_text = text;
            }
            if let Some(content) = patch.content {
                pick.content = content;
            }
            match patch.title {
                Patch::Absent => {}
                Patch::Null => pick.title = None,
                Patch::Value(title) => pick.title = Some(title),
            }
            pick.updated_at = Utc::now();

            tx.put_pick(&pick)?;
            Ok(PickView::from(&pick))
        })?;

        info!(%book_id, %pick_id, reenrich = !pending.is_empty(), "Pick edited");
        self.relay(pending).await;
        Ok(view)
    }
}
