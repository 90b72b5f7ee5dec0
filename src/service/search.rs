use uuid::Uuid;

use super::read::validate_limit;
use super::types::{BookSearchHit, Page, SearchHit, SearchParams};
use super::{BookService, ServiceError};
use crate::storage::models::PickRecord;
use crate::storage::{books, keywords, picks};

fn needle(query: &str) -> Result<String, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::validation("search query is required"));
    }
    Ok(query.to_lowercase())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn pick_matches(pick: &PickRecord, needle: &str) -> bool {
    contains(&pick.content_text, needle)
        || pick.title.as_deref().is_some_and(|title| contains(title, needle))
}

impl BookService {
    /// Case-insensitive substring search over the text and titles of one
    /// book's picks, in index order.
    pub async fn search_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        params: SearchParams,
    ) -> Result<Page<BookSearchHit>, ServiceError> {
        validate_limit(params.limit)?;
        let needle = needle(&params.query)?;

        let matched = self.db.read(|view| -> Result<Vec<PickRecord>, ServiceError> {
            let book = books::owned_book(view, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            let mut picks = picks::book_picks(view, book.id)?;
            picks.retain(|pick| pick_matches(pick, &needle));
            Ok(picks)
        })?;

        Ok(
            Page::slice(matched, params.offset, params.limit).map(|pick| BookSearchHit {
                pick_id: pick.guid,
                pick_title: pick.title,
                pick_content: pick.content_text,
                pick_index: pick.index,
            }),
        )
    }

    /// Library-wide search: a pick matches when its text, its title, one of
    /// its generated keywords or its book's title contains the query. Plain
    /// pattern matching, no embeddings.
    pub async fn semantic_search(
        &self,
        user_id: Uuid,
        params: SearchParams,
    ) -> Result<Page<SearchHit>, ServiceError> {
        validate_limit(params.limit)?;
        let needle = needle(&params.query)?;

        self.db.read(|view| -> Result<Page<SearchHit>, ServiceError> {
            let mut library = books::user_books(view, user_id)?;
            library.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

            let mut hits = Vec::new();
            for book in library {
                let title_matches = contains(&book.title, &needle);
                for pick in picks::book_picks(view, book.id)? {
                    let matched = title_matches
                        || pick_matches(&pick, &needle)
                        || keywords::pick_keywords(view, pick.id)?
                            .iter()
                            .any(|keyword| contains(&keyword.keyword, &needle));
                    if matched {
                        hits.push(SearchHit {
                            book_id: book.guid,
                            book_title: book.title.clone(),
                            pick_id: pick.guid,
                            pick_title: pick.title,
                            pick_content: pick.content_text,
                            pick_index: pick.index,
                        });
                    }
                }
            }
            Ok(Page::slice(hits, params.offset, params.limit))
        })
    }
}
