use rand::seq::SliceRandom;
use uuid::Uuid;

use super::types::TopicInput;
use crate::storage::models::TopicRecord;
use crate::storage::topics::ConflictPolicy;
use crate::storage::{DatabaseError, WriteView};

pub const DEFAULT_PALETTE: &[&str] = &[
    "#E57373", "#F06292", "#BA68C8", "#9575CD", "#7986CB", "#64B5F6", "#4FC3F7", "#4DD0E1",
    "#4DB6AC", "#81C784", "#AED581", "#DCE775", "#FFD54F", "#FFB74D", "#FF8A65", "#A1887F",
];

/// Colors assigned to newly created topics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<String>);

impl Palette {
    /// An empty list falls back to [`DEFAULT_PALETTE`].
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self(colors)
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }

    /// `count` random colors, distinct while the palette lasts
    pub fn choose(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count {
            let needed = count - chosen.len();
            chosen.extend(self.0.choose_multiple(&mut rng, needed).cloned());
        }
        chosen
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

/// Upsert each topic for the user and associate it with the book. Repeated
/// labels and existing associations are no-ops.
pub(super) fn tag_book(
    tx: &mut WriteView<'_>,
    user_id: Uuid,
    book_id: u64,
    topics: &[TopicInput],
    policy: ConflictPolicy,
    palette: &Palette,
) -> Result<Vec<TopicRecord>, DatabaseError> {
    let colors = palette.choose(topics.len());
    let mut tagged = Vec::with_capacity(topics.len());
    for (topic, fallback) in topics.iter().zip(colors) {
        let label = topic.label.trim();
        if label.is_empty() {
            continue;
        }
        let record = tx.upsert_topic(user_id, label, topic.color.as_deref(), &fallback, policy)?;
        tx.link_topic(book_id, record.id)?;
        tagged.push(record);
    }
    Ok(tagged)
}

/// Replace every topic of a book, then drop the user's topics that no book
/// uses anymore. Returns the labels of the dropped topics.
pub(super) fn replace_book_topics(
    tx: &mut WriteView<'_>,
    user_id: Uuid,
    book_id: u64,
    topics: &[TopicInput],
    palette: &Palette,
) -> Result<Vec<String>, DatabaseError> {
    tx.unlink_all_topics(book_id)?;
    tag_book(tx, user_id, book_id, topics, ConflictPolicy::OverwriteColor, palette)?;
    tx.delete_orphan_topics(user_id)
}
