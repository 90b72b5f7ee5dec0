use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::models::{BookRecord, Patch, PickRecord, TopicRecord};

// ============================================================================
// Inputs
// ============================================================================

/// A pick as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PickInput {
    pub content: String,
    pub content_text: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Insert position; appended when absent
    #[serde(default)]
    pub index: Option<u32>,
}

/// Either a new book (no `book_id`) or a new pick in an existing book
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePickParams {
    #[serde(default)]
    pub book_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub pick: PickInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicInput {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl TopicInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
        }
    }

    pub fn with_color(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: Some(color.into()),
        }
    }
}

/// New position for one pick of a reorder batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PickOrder {
    pub guid: Uuid,
    pub index: u32,
}

/// Partial book update. `topics: Some(vec![])` clears every topic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<TopicInput>>,
    #[serde(default)]
    pub picks: Option<Vec<PickOrder>>,
}

/// Partial pick update
#[derive(Debug, Clone, Default)]
pub struct PickPatch {
    pub content: Option<String>,
    pub content_text: Option<String>,
    pub title: Patch<String>,
}

impl PickPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.content_text.is_none() && self.title.is_absent()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct ListBooksParams {
    pub offset: usize,
    pub limit: usize,
    /// Topic labels to filter by; empty or containing "all" disables filtering
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShortListParams {
    pub offset: usize,
    pub limit: usize,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListPicksParams {
    pub offset: usize,
    pub limit: usize,
    pub order: SortOrder,
    /// Widen the page so that it reaches this pick
    pub until_pick: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub offset: usize,
    pub limit: usize,
}

// ============================================================================
// Views
// ============================================================================

/// One page of an ordered result plus the size of the whole result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Cut `offset..offset + limit` out of `items`
    pub fn slice(items: Vec<T>, offset: usize, limit: usize) -> Self {
        let total = items.len() as u64;
        Self {
            items: items.into_iter().skip(offset).take(limit).collect(),
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicView {
    pub label: String,
    pub color: String,
}

impl From<&TopicRecord> for TopicView {
    fn from(topic: &TopicRecord) -> Self {
        Self {
            label: topic.label.clone(),
            color: topic.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickView {
    pub id: Uuid,
    pub content: String,
    pub content_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub index: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PickRecord> for PickView {
    fn from(pick: &PickRecord) -> Self {
        Self {
            id: pick.guid,
            content: pick.content.clone(),
            content_text: pick.content_text.clone(),
            title: pick.title.clone(),
            index: pick.index,
            created_at: pick.created_at,
            updated_at: pick.updated_at,
        }
    }
}

/// A randomly chosen pick shown as the book's teaser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView {
    pub id: Uuid,
    pub content_text: String,
}

/// A book with its topics, pick count, preview and most recent picks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub topics: Vec<TopicView>,
    pub picks_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewView>,
    /// Highest indexes first
    pub picks: Vec<PickView>,
}

impl BookView {
    pub(crate) fn new(book: &BookRecord) -> Self {
        Self {
            id: book.guid,
            title: book.title.clone(),
            author: book.author.clone(),
            created_at: book.created_at,
            updated_at: book.updated_at,
            topics: Vec::new(),
            picks_count: 0,
            preview: None,
            picks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortBookView {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCount {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub count: u64,
}

/// Match of a search inside one book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSearchHit {
    pub pick_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_title: Option<String>,
    pub pick_content: String,
    pub pick_index: u32,
}

/// Match of a search across a user's library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub book_id: Uuid,
    pub book_title: String,
    pub pick_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_title: Option<String>,
    pub pick_content: String,
    pub pick_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CreateOutcome {
    Book(BookView),
    Pick(PickView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// The deleted pick was the book's last, so the book is gone too
    pub is_last_pick: bool,
}
