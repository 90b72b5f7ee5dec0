use std::collections::HashSet;

use rand::seq::SliceRandom;
use uuid::Uuid;

use super::types::{
    BookView, ListBooksParams, ListPicksParams, Page, PickView, PreviewView, ShortBookView,
    ShortListParams, SortOrder, TopicCount, TopicView,
};
use super::{BookService, ServiceError};
use crate::storage::models::BookRecord;
use crate::storage::{books, picks, topics, DatabaseError, TableView};

/// Label of the synthetic topic that stands for the whole library
pub const ALL_TOPICS: &str = "all";

/// Build the full view of a book from one consistent view of the tables.
pub(super) fn assemble_book(
    view: &impl TableView,
    book: &BookRecord,
    recent: usize,
) -> Result<BookView, DatabaseError> {
    let mut assembled = BookView::new(book);
    assembled.topics = topics::book_topics(view, book.id)?
        .iter()
        .map(TopicView::from)
        .collect();

    let picks = picks::book_picks(view, book.id)?;
    assembled.picks_count = picks.len() as u64;
    assembled.preview = picks.choose(&mut rand::thread_rng()).map(|pick| PreviewView {
        id: pick.guid,
        content_text: pick.content_text.clone(),
    });
    assembled.picks = picks.iter().rev().take(recent).map(PickView::from).collect();
    Ok(assembled)
}

pub(super) fn validate_limit(limit: usize) -> Result<(), ServiceError> {
    if limit == 0 {
        return Err(ServiceError::validation("limit must be positive"));
    }
    Ok(())
}

/// Most recently modified first; creation order breaks ties
fn by_last_modified(books: &mut [BookRecord]) {
    books.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

impl BookService {
    /// A user's book with its topics, pick count, random preview and most
    /// recent picks, all read from the same snapshot.
    pub async fn complete_book(
        &self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> Result<BookView, ServiceError> {
        self.db.read(|view| -> Result<BookView, ServiceError> {
            let book = books::owned_book(view, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            Ok(assemble_book(view, &book, self.config.recent_picks)?)
        })
    }

    /// A page of the user's books, most recently modified first, optionally
    /// restricted to books carrying at least one of the given topics.
    pub async fn list_books(
        &self,
        user_id: Uuid,
        params: ListBooksParams,
    ) -> Result<Page<BookView>, ServiceError> {
        validate_limit(params.limit)?;
        let filter: HashSet<&str> = params.topics.iter().map(|t| t.trim()).collect();
        let unfiltered = filter.is_empty() || filter.contains(ALL_TOPICS);

        self.db.read(|view| -> Result<Page<BookView>, ServiceError> {
            let mut selected = Vec::new();
            for book in books::user_books(view, user_id)? {
                if !unfiltered {
                    let tagged = topics::book_topics(view, book.id)?
                        .iter()
                        .any(|topic| filter.contains(topic.label.as_str()));
                    if !tagged {
                        continue;
                    }
                }
                selected.push(book);
            }
            by_last_modified(&mut selected);

            let page = Page::slice(selected, params.offset, params.limit);
            let mut items = Vec::with_capacity(page.items.len());
            for book in &page.items {
                items.push(assemble_book(view, book, self.config.recent_picks)?);
            }
            Ok(Page {
                items,
                total: page.total,
            })
        })
    }

    /// Ids and titles of the user's books, optionally filtered by a
    /// case-insensitive title search.
    pub async fn short_books(
        &self,
        user_id: Uuid,
        params: ShortListParams,
    ) -> Result<Page<ShortBookView>, ServiceError> {
        validate_limit(params.limit)?;
        let needle = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut selected = self.db.read(|view| books::user_books(view, user_id))?;
        if let Some(needle) = &needle {
            selected.retain(|book| book.title.to_lowercase().contains(needle));
        }
        by_last_modified(&mut selected);

        Ok(
            Page::slice(selected, params.offset, params.limit).map(|book| ShortBookView {
                id: book.guid,
                title: book.title,
            }),
        )
    }

    /// A page of a book's picks ordered by index. With `until_pick` the page
    /// is widened to a whole number of `limit`-sized pages that reaches that
    /// pick.
    pub async fn book_picks(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        params: ListPicksParams,
    ) -> Result<Page<PickView>, ServiceError> {
        validate_limit(params.limit)?;

        let mut ordered = self.db.read(|view| -> Result<_, ServiceError> {
            let book = books::owned_book(view, user_id, book_id)?
                .ok_or(ServiceError::NotFound("Book"))?;
            Ok(picks::book_picks(view, book.id)?)
        })?;
        if params.order == SortOrder::Desc {
            ordered.reverse();
        }

        let mut limit = params.limit;
        if let Some(until) = params.until_pick {
            let position = ordered
                .iter()
                .position(|pick| pick.guid == until)
                .ok_or(ServiceError::NotFound("Pick"))?;
            let reach = position + 1;
            limit = reach.div_ceil(params.limit) * params.limit;
        }

        Ok(Page::slice(ordered, params.offset, limit).map(|pick| PickView::from(&pick)))
    }

    /// Topic labels of the user with the number of books carrying each,
    /// preceded by the synthetic "all" entry counting every book.
    pub async fn user_topics(&self, user_id: Uuid) -> Result<Vec<TopicCount>, ServiceError> {
        self.db.read(|view| -> Result<Vec<TopicCount>, ServiceError> {
            let mut counts = vec![TopicCount {
                label: ALL_TOPICS.to_string(),
                color: None,
                count: books::count_user_books(view, user_id)?,
            }];
            for topic in topics::user_topics(view, user_id)? {
                let count = topics::topic_book_ids(view, topic.id)?.len() as u64;
                if count == 0 {
                    continue;
                }
                counts.push(TopicCount {
                    label: topic.label,
                    color: Some(topic.color),
                    count,
                });
            }
            Ok(counts)
        })
    }
}
