use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated, UserId};
use crate::service::{
    BookPatch, BookView, CreateOutcome, CreatePickParams, ListBooksParams, PickInput,
    ShortBookView, ShortListParams, TopicCount,
};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePickRequest {
    /// Existing book to add the pick to; a new book is created when absent
    #[serde(default)]
    pub book_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub content: String,
    pub content_text: String,
    #[serde(default)]
    pub pick_title: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBookRequest {
    pub book_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Comma separated topic labels
    #[serde(default)]
    pub topics: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShortBooksQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub search: Option<String>,
}

pub(super) fn default_limit() -> u32 {
    20
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_pick(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    AppJson(req): AppJson<CreatePickRequest>,
) -> Result<Json<JSend<CreateOutcome>>, ApiError> {
    let params = CreatePickParams {
        book_id: req.book_id,
        title: req.title,
        author: req.author,
        pick: PickInput {
            content: req.content,
            content_text: req.content_text,
            title: req.pick_title,
            index: req.index,
        },
    };

    let outcome = state.service.create_pick(user_id, params).await?;
    Ok(JSend::success(outcome))
}

pub async fn save_book(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    AppJson(req): AppJson<SaveBookRequest>,
) -> Result<Json<JSend<BookView>>, ApiError> {
    let book = state.service.save_book(user_id, req.book_id).await?;
    Ok(JSend::success(book))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(book_id): Path<Uuid>,
) -> Result<Json<JSend<BookView>>, ApiError> {
    let book = state.service.complete_book(user_id, book_id).await?;
    Ok(JSend::success(book))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(book_id): Path<Uuid>,
    AppJson(patch): AppJson<BookPatch>,
) -> Result<Json<JSend<BookView>>, ApiError> {
    if patch.title.is_none()
        && patch.author.is_none()
        && patch.topics.is_none()
        && patch.picks.is_none()
    {
        return Err(ApiError::bad_request(
            "at least one field (title, author, topics, picks) must be provided",
        ));
    }

    state.service.edit_book(user_id, book_id, patch).await?;

    let book = state.service.complete_book(user_id, book_id).await?;
    Ok(JSend::success(book))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(book_id): Path<Uuid>,
) -> Result<Json<JSend<()>>, ApiError> {
    state.service.delete_book(user_id, book_id).await?;
    Ok(JSend::success(()))
}

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    AppQuery(query): AppQuery<ListBooksQuery>,
) -> Result<Json<JSendPaginated<BookView>>, ApiError> {
    let topics = query
        .topics
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let page = state
        .service
        .list_books(
            user_id,
            ListBooksParams {
                offset: query.offset as usize,
                limit: query.limit as usize,
                topics,
            },
        )
        .await?;
    Ok(JSendPaginated::page(page, query.limit, query.offset))
}

pub async fn short_books(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    AppQuery(query): AppQuery<ShortBooksQuery>,
) -> Result<Json<JSendPaginated<ShortBookView>>, ApiError> {
    let page = state
        .service
        .short_books(
            user_id,
            ShortListParams {
                offset: query.offset as usize,
                limit: query.limit as usize,
                search: query.search,
            },
        )
        .await?;
    Ok(JSendPaginated::page(page, query.limit, query.offset))
}

pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<JSend<Vec<TopicCount>>>, ApiError> {
    let topics = state.service.user_topics(user_id).await?;
    Ok(JSend::success(topics))
}
