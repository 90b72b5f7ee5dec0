//! Transaction-scoped access to every application table.
//!
//! [`TableView`] abstracts over read-only and writable tables so lookups are
//! written once and shared by read snapshots and write transactions. Mutations
//! live on [`WriteView`] and are spread across the per-entity modules.

use redb::{ReadOnlyTable, ReadTransaction, ReadableTable, Table, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::db::DatabaseError;
use super::tables::*;

pub trait TableView {
    type Records: ReadableTable<u64, &'static [u8]>;
    type Guids: ReadableTable<u128, u64>;
    type Owners: ReadableTable<(u128, u64), ()>;
    type Links: ReadableTable<(u64, u64), ()>;
    type Labels: ReadableTable<(u128, &'static str), u64>;

    fn books(&self) -> &Self::Records;
    fn book_guids(&self) -> &Self::Guids;
    fn user_books(&self) -> &Self::Owners;
    fn picks(&self) -> &Self::Records;
    fn pick_guids(&self) -> &Self::Guids;
    fn book_picks(&self) -> &Self::Links;
    fn topics(&self) -> &Self::Records;
    fn topic_labels(&self) -> &Self::Labels;
    fn book_topics(&self) -> &Self::Links;
    fn topic_books(&self) -> &Self::Links;
    fn keywords(&self) -> &Self::Records;
    fn keyword_index(&self) -> &Self::Links;
    fn outbox(&self) -> &Self::Records;
}

/// All tables opened from one read transaction (a consistent snapshot).
pub struct ReadView {
    books: ReadOnlyTable<u64, &'static [u8]>,
    book_guids: ReadOnlyTable<u128, u64>,
    user_books: ReadOnlyTable<(u128, u64), ()>,
    picks: ReadOnlyTable<u64, &'static [u8]>,
    pick_guids: ReadOnlyTable<u128, u64>,
    book_picks: ReadOnlyTable<(u64, u64), ()>,
    topics: ReadOnlyTable<u64, &'static [u8]>,
    topic_labels: ReadOnlyTable<(u128, &'static str), u64>,
    book_topics: ReadOnlyTable<(u64, u64), ()>,
    topic_books: ReadOnlyTable<(u64, u64), ()>,
    keywords: ReadOnlyTable<u64, &'static [u8]>,
    keyword_index: ReadOnlyTable<(u64, u64), ()>,
    outbox: ReadOnlyTable<u64, &'static [u8]>,
}

impl ReadView {
    pub fn open(txn: &ReadTransaction) -> Result<Self, DatabaseError> {
        Ok(Self {
            books: txn.open_table(BOOKS)?,
            book_guids: txn.open_table(BOOK_GUIDS)?,
            user_books: txn.open_table(USER_BOOKS)?,
            picks: txn.open_table(PICKS)?,
            pick_guids: txn.open_table(PICK_GUIDS)?,
            book_picks: txn.open_table(BOOK_PICKS)?,
            topics: txn.open_table(TOPICS)?,
            topic_labels: txn.open_table(TOPIC_LABELS)?,
            book_topics: txn.open_table(BOOK_TOPICS)?,
            topic_books: txn.open_table(TOPIC_BOOKS)?,
            keywords: txn.open_table(PICK_KEYWORDS)?,
            keyword_index: txn.open_table(KEYWORD_INDEX)?,
            outbox: txn.open_table(ENRICHMENT_OUTBOX)?,
        })
    }
}

/// All tables opened from one write transaction.
pub struct WriteView<'txn> {
    pub(crate) books: Table<'txn, u64, &'static [u8]>,
    pub(crate) book_guids: Table<'txn, u128, u64>,
    pub(crate) user_books: Table<'txn, (u128, u64), ()>,
    pub(crate) picks: Table<'txn, u64, &'static [u8]>,
    pub(crate) pick_guids: Table<'txn, u128, u64>,
    pub(crate) book_picks: Table<'txn, (u64, u64), ()>,
    pub(crate) topics: Table<'txn, u64, &'static [u8]>,
    pub(crate) topic_labels: Table<'txn, (u128, &'static str), u64>,
    pub(crate) book_topics: Table<'txn, (u64, u64), ()>,
    pub(crate) topic_books: Table<'txn, (u64, u64), ()>,
    pub(crate) keywords: Table<'txn, u64, &'static [u8]>,
    pub(crate) keyword_index: Table<'txn, (u64, u64), ()>,
    pub(crate) outbox: Table<'txn, u64, &'static [u8]>,
    pub(crate) sequences: Table<'txn, &'static str, u64>,
}

impl<'txn> WriteView<'txn> {
    pub fn open(txn: &'txn WriteTransaction) -> Result<Self, DatabaseError> {
        Ok(Self {
            books: txn.open_table(BOOKS)?,
            book_guids: txn.open_table(BOOK_GUIDS)?,
            user_books: txn.open_table(USER_BOOKS)?,
            picks: txn.open_table(PICKS)?,
            pick_guids: txn.open_table(PICK_GUIDS)?,
            book_picks: txn.open_table(BOOK_PICKS)?,
            topics: txn.open_table(TOPICS)?,
            topic_labels: txn.open_table(TOPIC_LABELS)?,
            book_topics: txn.open_table(BOOK_TOPICS)?,
            topic_books: txn.open_table(TOPIC_BOOKS)?,
            keywords: txn.open_table(PICK_KEYWORDS)?,
            keyword_index: txn.open_table(KEYWORD_INDEX)?,
            outbox: txn.open_table(ENRICHMENT_OUTBOX)?,
            sequences: txn.open_table(SEQUENCES)?,
        })
    }

    /// Allocate the next internal id for `sequence` (ids start at 1).
    pub fn next_id(&mut self, sequence: &str) -> Result<u64, DatabaseError> {
        let current = self.sequences.get(sequence)?.map(|v| v.value()).unwrap_or(0);
        let next = current + 1;
        self.sequences.insert(sequence, next)?;
        Ok(next)
    }
}

macro_rules! table_view {
    ([$($lt:lifetime)?] $view:ty, $records:ty, $guids:ty, $owners:ty, $links:ty, $labels:ty) => {
        impl<$($lt)?> TableView for $view {
            type Records = $records;
            type Guids = $guids;
            type Owners = $owners;
            type Links = $links;
            type Labels = $labels;

            fn books(&self) -> &Self::Records {
                &self.books
            }
            fn book_guids(&self) -> &Self::Guids {
                &self.book_guids
            }
            fn user_books(&self) -> &Self::Owners {
                &self.user_books
            }
            fn picks(&self) -> &Self::Records {
                &self.picks
            }
            fn pick_guids(&self) -> &Self::Guids {
                &self.pick_guids
            }
            fn book_picks(&self) -> &Self::Links {
                &self.book_picks
            }
            fn topics(&self) -> &Self::Records {
                &self.topics
            }
            fn topic_labels(&self) -> &Self::Labels {
                &self.topic_labels
            }
            fn book_topics(&self) -> &Self::Links {
                &self.book_topics
            }
            fn topic_books(&self) -> &Self::Links {
                &self.topic_books
            }
            fn keywords(&self) -> &Self::Records {
                &self.keywords
            }
            fn keyword_index(&self) -> &Self::Links {
                &self.keyword_index
            }
            fn outbox(&self) -> &Self::Records {
                &self.outbox
            }
        }
    };
}

table_view!(
    [] ReadView,
    ReadOnlyTable<u64, &'static [u8]>,
    ReadOnlyTable<u128, u64>,
    ReadOnlyTable<(u128, u64), ()>,
    ReadOnlyTable<(u64, u64), ()>,
    ReadOnlyTable<(u128, &'static str), u64>
);

table_view!(
    ['txn] WriteView<'txn>,
    Table<'txn, u64, &'static [u8]>,
    Table<'txn, u128, u64>,
    Table<'txn, (u128, u64), ()>,
    Table<'txn, (u64, u64), ()>,
    Table<'txn, (u128, &'static str), u64>
);

// ============================================================================
// Generic row helpers
// ============================================================================

/// Decode the msgpack record stored under `id`.
pub(crate) fn load<R: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> Result<Option<R>, DatabaseError> {
    let record = match table.get(id)? {
        Some(data) => Some(rmp_serde::from_slice(data.value())?),
        None => None,
    };
    Ok(record)
}

/// Encode `record` as msgpack and store it under `id`.
pub(crate) fn store<R: Serialize>(
    table: &mut Table<'_, u64, &'static [u8]>,
    id: u64,
    record: &R,
) -> Result<(), DatabaseError> {
    let data = rmp_serde::to_vec_named(record)?;
    table.insert(id, data.as_slice())?;
    Ok(())
}

/// Second components of every `(parent, child)` link for `parent`, in ascending order.
pub(crate) fn children(
    table: &impl ReadableTable<(u64, u64), ()>,
    parent: u64,
) -> Result<Vec<u64>, DatabaseError> {
    let mut ids = Vec::new();
    for entry in table.range((parent, 0u64)..=(parent, u64::MAX))? {
        let (key, _) = entry?;
        ids.push(key.value().1);
    }
    Ok(ids)
}
