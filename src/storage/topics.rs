use redb::ReadableTable;
use uuid::Uuid;

use super::db::DatabaseError;
use super::models::TopicRecord;
use super::tables::TOPIC_SEQUENCE;
use super::view::{children, load, store, TableView, WriteView};

/// What to do when upserting a (user, label) pair that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Leave the existing row untouched (insert-if-absent)
    Keep,
    /// Replace the existing row's color
    OverwriteColor,
}

// ============================================================================
// Topic lookups
// ============================================================================

/// Get a topic by its internal id
pub fn topic_by_id(view: &impl TableView, id: u64) -> Result<Option<TopicRecord>, DatabaseError> {
    load(view.topics(), id)
}

/// Get a user's topic by label
pub fn topic_by_label(
    view: &impl TableView,
    user_id: Uuid,
    label: &str,
) -> Result<Option<TopicRecord>, DatabaseError> {
    let id = match view.topic_labels().get((user_id.as_u128(), label))? {
        Some(id) => id.value(),
        None => return Ok(None),
    };
    topic_by_id(view, id)
}

/// Topics associated with a book, in association order
pub fn book_topics(view: &impl TableView, book_id: u64) -> Result<Vec<TopicRecord>, DatabaseError> {
    let mut topics = Vec::new();
    for id in children(view.book_topics(), book_id)? {
        match topic_by_id(view, id)? {
            Some(topic) => topics.push(topic),
            None => return Err(DatabaseError::Corrupt(format!("dangling topic {id}"))),
        }
    }
    Ok(topics)
}

/// Ids of the books associated with a topic
pub fn topic_book_ids(view: &impl TableView, topic_id: u64) -> Result<Vec<u64>, DatabaseError> {
    children(view.topic_books(), topic_id)
}

/// Every topic row of a user, ordered by label
pub fn user_topics(view: &impl TableView, user_id: Uuid) -> Result<Vec<TopicRecord>, DatabaseError> {
    let user = user_id.as_u128();
    let mut ids = Vec::new();
    for entry in view.topic_labels().range((user, "")..)? {
        let (key, id) = entry?;
        if key.value().0 != user {
            break;
        }
        ids.push(id.value());
    }

    let mut topics = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(topic) = topic_by_id(view, id)? {
            topics.push(topic);
        }
    }
    Ok(topics)
}

// ============================================================================
// Topic mutations
// ============================================================================

impl WriteView<'_> {
    /// Insert a (user, label) topic, resolving conflicts with `policy`.
    /// `color` is only consulted when inserting or overwriting.
    pub fn upsert_topic(
        &mut self,
        user_id: Uuid,
        label: &str,
        color: Option<&str>,
        default_color: &str,
        policy: ConflictPolicy,
    ) -> Result<TopicRecord, DatabaseError> {
        if let Some(mut topic) = topic_by_label(&*self, user_id, label)? {
            if let (ConflictPolicy::OverwriteColor, Some(color)) = (policy, color) {
                if topic.color != color {
                    topic.color = color.to_string();
                    store(&mut self.topics, topic.id, &topic)?;
                }
            }
            return Ok(topic);
        }

        let topic = TopicRecord {
            id: self.next_id(TOPIC_SEQUENCE)?,
            user_id,
            label: label.to_string(),
            color: color.unwrap_or(default_color).to_string(),
        };
        store(&mut self.topics, topic.id, &topic)?;
        self.topic_labels
            .insert((user_id.as_u128(), label), topic.id)?;
        Ok(topic)
    }

    /// Associate a topic with a book. Returns false if already associated.
    pub fn link_topic(&mut self, book_id: u64, topic_id: u64) -> Result<bool, DatabaseError> {
        let existed = self.book_topics.insert((book_id, topic_id), ())?.is_some();
        self.topic_books.insert((topic_id, book_id), ())?;
        Ok(!existed)
    }

    /// Remove every topic association of a book
    pub fn unlink_all_topics(&mut self, book_id: u64) -> Result<(), DatabaseError> {
        for topic_id in children(&self.book_topics, book_id)? {
            self.book_topics.remove((book_id, topic_id))?;
            self.topic_books.remove((topic_id, book_id))?;
        }
        Ok(())
    }

    /// Delete the user's topics that no book references anymore
    pub fn delete_orphan_topics(&mut self, user_id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let mut deleted = Vec::new();
        for topic in user_topics(&*self, user_id)? {
            if children(&self.topic_books, topic.id)?.is_empty() {
                self.topics.remove(topic.id)?;
                self.topic_labels
                    .remove((user_id.as_u128(), topic.label.as_str()))?;
                deleted.push(topic.label);
            }
        }
        Ok(deleted)
    }
}
