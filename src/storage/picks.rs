use chrono::Utc;
use redb::ReadableTable;
use uuid::Uuid;

use super::db::DatabaseError;
use super::models::{BookRecord, PickRecord};
use super::tables::PICK_SEQUENCE;
use super::view::{children, load, store, TableView, WriteView};

/// Fields of a pick supplied by the caller at creation time
#[derive(Debug, Clone, Default)]
pub struct NewPick<'a> {
    pub content: &'a str,
    pub content_text: &'a str,
    pub title: Option<&'a str>,
}

// ============================================================================
// Pick lookups
// ============================================================================

/// Get a pick by its internal id
pub fn pick_by_id(view: &impl TableView, id: u64) -> Result<Option<PickRecord>, DatabaseError> {
    load(view.picks(), id)
}

/// Get a pick by its external guid
pub fn pick_by_guid(
    view: &impl TableView,
    guid: Uuid,
) -> Result<Option<PickRecord>, DatabaseError> {
    let id = match view.pick_guids().get(guid.as_u128())? {
        Some(id) => id.value(),
        None => return Ok(None),
    };
    pick_by_id(view, id)
}

/// Get a pick by guid only when it belongs to `book_id`
pub fn book_pick_by_guid(
    view: &impl TableView,
    book_id: u64,
    guid: Uuid,
) -> Result<Option<PickRecord>, DatabaseError> {
    Ok(pick_by_guid(view, guid)?.filter(|pick| pick.book_id == book_id))
}

/// All picks of a book sorted by ascending index
pub fn book_picks(view: &impl TableView, book_id: u64) -> Result<Vec<PickRecord>, DatabaseError> {
    let mut picks = Vec::new();
    for id in children(view.book_picks(), book_id)? {
        match pick_by_id(view, id)? {
            Some(pick) => picks.push(pick),
            None => return Err(DatabaseError::Corrupt(format!("dangling pick {id}"))),
        }
    }
    picks.sort_by_key(|pick| pick.index);
    Ok(picks)
}

/// Number of picks in a book
pub fn count_book_picks(view: &impl TableView, book_id: u64) -> Result<u64, DatabaseError> {
    Ok(children(view.book_picks(), book_id)?.len() as u64)
}

// ============================================================================
// Pick mutations
// ============================================================================

impl WriteView<'_> {
    /// Store a new pick at `index`. Callers must make room first with
    /// [`WriteView::shift_picks_up`] when inserting before the end.
    pub fn insert_pick(
        &mut self,
        book: &BookRecord,
        user_id: Uuid,
        pick: NewPick<'_>,
        index: u32,
    ) -> Result<PickRecord, DatabaseError> {
        let now = Utc::now();
        let record = PickRecord {
            id: self.next_id(PICK_SEQUENCE)?,
            guid: Uuid::new_v4(),
            book_id: book.id,
            user_id,
            content: pick.content.to_string(),
            content_text: pick.content_text.to_string(),
            title: pick.title.map(str::to_string),
            index,
            created_at: now,
            updated_at: now,
        };

        store(&mut self.picks, record.id, &record)?;
        self.pick_guids.insert(record.guid.as_u128(), record.id)?;
        self.book_picks.insert((book.id, record.id), ())?;
        Ok(record)
    }

    /// Overwrite a pick's stored fields
    pub fn put_pick(&mut self, pick: &PickRecord) -> Result<(), DatabaseError> {
        store(&mut self.picks, pick.id, pick)
    }

    /// Delete a single pick and its keywords. Does not touch sibling indexes.
    pub fn delete_pick(&mut self, pick: &PickRecord) -> Result<(), DatabaseError> {
        self.delete_pick_keywords(pick.id)?;
        self.picks.remove(pick.id)?;
        self.pick_guids.remove(pick.guid.as_u128())?;
        self.book_picks.remove((pick.book_id, pick.id))?;
        Ok(())
    }

    /// Increment the index of every pick in the book with `index >= from`.
    pub fn shift_picks_up(&mut self, book_id: u64, from: u32) -> Result<u64, DatabaseError> {
        self.shift_picks(book_id, |index| (index >= from).then(|| index + 1))
    }

    /// Decrement the index of every pick in the book with `index > after`.
    pub fn shift_picks_down(&mut self, book_id: u64, after: u32) -> Result<u64, DatabaseError> {
        self.shift_picks(book_id, |index| (index > after).then(|| index - 1))
    }

    fn shift_picks(
        &mut self,
        book_id: u64,
        shift: impl Fn(u32) -> Option<u32>,
    ) -> Result<u64, DatabaseError> {
        let mut shifted = 0;
        for mut pick in book_picks(&*self, book_id)? {
            if let Some(index) = shift(pick.index) {
                pick.index = index;
                self.put_pick(&pick)?;
                shifted += 1;
            }
        }
        Ok(shifted)
    }
}
