use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use super::db::DatabaseError;
use super::models::KeywordRecord;
use super::tables::KEYWORD_SEQUENCE;
use super::view::{children, load, store, TableView, WriteView};

/// Keywords generated for a pick, in insertion order
pub fn pick_keywords(
    view: &impl TableView,
    pick_id: u64,
) -> Result<Vec<KeywordRecord>, DatabaseError> {
    let mut keywords = Vec::new();
    for id in children(view.keyword_index(), pick_id)? {
        match load(view.keywords(), id)? {
            Some(keyword) => keywords.push(keyword),
            None => return Err(DatabaseError::Corrupt(format!("dangling keyword {id}"))),
        }
    }
    Ok(keywords)
}

impl WriteView<'_> {
    /// Store one keyword row for a pick
    pub fn insert_keyword(
        &mut self,
        pick_id: u64,
        user_id: Uuid,
        keyword: &str,
    ) -> Result<KeywordRecord, DatabaseError> {
        let record = KeywordRecord {
            id: self.next_id(KEYWORD_SEQUENCE)?,
            pick_id,
            user_id,
            keyword: keyword.to_string(),
            created_at: Utc::now(),
        };
        store(&mut self.keywords, record.id, &record)?;
        self.keyword_index.insert((pick_id, record.id), ())?;
        Ok(record)
    }

    /// Append keywords to a pick, skipping any the pick already has so that
    /// redelivered enrichment messages do not duplicate rows.
    pub fn append_keywords(
        &mut self,
        pick_id: u64,
        user_id: Uuid,
        keywords: &[String],
    ) -> Result<Vec<KeywordRecord>, DatabaseError> {
        let mut seen: HashSet<String> = pick_keywords(&*self, pick_id)?
            .into_iter()
            .map(|k| k.keyword)
            .collect();

        let mut inserted = Vec::new();
        for keyword in keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() || !seen.insert(keyword.to_string()) {
                continue;
            }
            inserted.push(self.insert_keyword(pick_id, user_id, keyword)?);
        }
        Ok(inserted)
    }

    /// Delete every keyword row of a pick
    pub fn delete_pick_keywords(&mut self, pick_id: u64) -> Result<(), DatabaseError> {
        for id in children(&self.keyword_index, pick_id)? {
            self.keywords.remove(id)?;
            self.keyword_index.remove((pick_id, id))?;
        }
        Ok(())
    }
}
