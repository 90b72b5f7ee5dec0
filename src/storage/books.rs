use chrono::Utc;
use redb::ReadableTable;
use uuid::Uuid;

use super::db::DatabaseError;
use super::models::BookRecord;
use super::tables::BOOK_SEQUENCE;
use super::view::{children, load, store, TableView, WriteView};
use super::picks;

// ============================================================================
// Book lookups
// ============================================================================

/// Get a book by its internal id
pub fn book_by_id(view: &impl TableView, id: u64) -> Result<Option<BookRecord>, DatabaseError> {
    load(view.books(), id)
}

/// Get a book by its external guid, regardless of owner
pub fn book_by_guid(
    view: &impl TableView,
    guid: Uuid,
) -> Result<Option<BookRecord>, DatabaseError> {
    let id = match view.book_guids().get(guid.as_u128())? {
        Some(id) => id.value(),
        None => return Ok(None),
    };
    book_by_id(view, id)
}

/// Get a book by guid only when `user_id` owns it
pub fn owned_book(
    view: &impl TableView,
    user_id: Uuid,
    guid: Uuid,
) -> Result<Option<BookRecord>, DatabaseError> {
    Ok(book_by_guid(view, guid)?.filter(|book| book.user_id == user_id))
}

/// All books owned by a user, in creation order
pub fn user_books(view: &impl TableView, user_id: Uuid) -> Result<Vec<BookRecord>, DatabaseError> {
    let user = user_id.as_u128();
    let mut ids = Vec::new();
    for entry in view.user_books().range((user, 0u64)..=(user, u64::MAX))? {
        let (key, _) = entry?;
        ids.push(key.value().1);
    }

    let mut books = Vec::with_capacity(ids.len());
    for id in ids {
        match book_by_id(view, id)? {
            Some(book) => books.push(book),
            None => return Err(DatabaseError::Corrupt(format!("dangling book {id}"))),
        }
    }
    Ok(books)
}

/// Number of books owned by a user
pub fn count_user_books(view: &impl TableView, user_id: Uuid) -> Result<u64, DatabaseError> {
    let user = user_id.as_u128();
    let mut count = 0;
    for entry in view.user_books().range((user, 0u64)..=(user, u64::MAX))? {
        entry?;
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// Book mutations
// ============================================================================

impl WriteView<'_> {
    /// Create a book owned by `user_id` with a fresh identity
    pub fn insert_book(
        &mut self,
        user_id: Uuid,
        title: &str,
        author: &str,
    ) -> Result<BookRecord, DatabaseError> {
        let now = Utc::now();
        let book = BookRecord {
            id: self.next_id(BOOK_SEQUENCE)?,
            guid: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            author: author.to_string(),
            created_at: now,
            updated_at: now,
        };

        store(&mut self.books, book.id, &book)?;
        self.book_guids.insert(book.guid.as_u128(), book.id)?;
        self.user_books.insert((user_id.as_u128(), book.id), ())?;
        Ok(book)
    }

    /// Overwrite a book's stored fields (identity indexes are left untouched)
    pub fn put_book(&mut self, book: &BookRecord) -> Result<(), DatabaseError> {
        store(&mut self.books, book.id, book)
    }

    /// Bump a book's last-modified timestamp
    pub fn touch_book(&mut self, book: &mut BookRecord) -> Result<(), DatabaseError> {
        book.updated_at = Utc::now();
        self.put_book(book)
    }

    /// Delete a book and cascade to its picks, their keywords, and its topic
    /// associations. Topics themselves are left for orphan collection.
    pub fn delete_book(&mut self, book: &BookRecord) -> Result<(), DatabaseError> {
        for pick_id in children(&self.book_picks, book.id)? {
            self.delete_pick_keywords(pick_id)?;
            if let Some(pick) = picks::pick_by_id(&*self, pick_id)? {
                self.pick_guids.remove(pick.guid.as_u128())?;
            }
            self.picks.remove(pick_id)?;
            self.book_picks.remove((book.id, pick_id))?;
        }

        self.unlink_all_topics(book.id)?;

        self.books.remove(book.id)?;
        self.book_guids.remove(book.guid.as_u128())?;
        self.user_books.remove((book.user_id.as_u128(), book.id))?;
        Ok(())
    }
}
