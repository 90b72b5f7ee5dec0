use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Edit of an optional field. Pick title edits use it so that an explicit
/// `null` (clear) differs from an omitted field (keep).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Field was not included in the request (no change).
    #[default]
    Absent,
    /// Field was explicitly set to null (clear it).
    Null,
    /// Field was set to a new value.
    Value(T),
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(v: Option<Option<T>>) -> Self {
        match v {
            None => Patch::Absent,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Value(v),
        }
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

/// A book stored in redb. Owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub guid: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A highlighted excerpt. `index` is the zero-based position within the parent book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRecord {
    pub id: u64,
    pub guid: Uuid,
    pub book_id: u64,
    pub user_id: Uuid,
    /// Rich content (structured JSON document, stored verbatim)
    pub content: String,
    /// Plain-text projection used for search and enrichment
    pub content_text: String,
    #[serde(default)]
    pub title: Option<String>,
    pub index: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-scoped topic label with its display color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: u64,
    pub user_id: Uuid,
    pub label: String,
    pub color: String,
}

/// A search keyword generated for a pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub id: u64,
    pub pick_id: u64,
    pub user_id: Uuid,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

/// Request for keyword generation, written to the outbox and relayed to the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentMessage {
    pub pick_id: u64,
    pub user_id: Uuid,
    pub text: String,
}
