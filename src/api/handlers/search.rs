use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::books::default_limit;
use crate::api::response::{ApiError, AppQuery, JSendPaginated, UserId};
use crate::service::{BookSearchHit, SearchHit, SearchParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl SearchQuery {
    fn params(&self) -> SearchParams {
        SearchParams {
            query: self.q.clone(),
            offset: self.offset as usize,
            limit: self.limit as usize,
        }
    }
}

pub async fn search_book(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(book_id): Path<Uuid>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<JSendPaginated<BookSearchHit>>, ApiError> {
    let page = state.service.search_book(user_id, book_id, query.params()).await?;
    Ok(JSendPaginated::page(page, query.limit, query.offset))
}

pub async fn search_library(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<JSendPaginated<SearchHit>>, ApiError> {
    let page = state.service.semantic_search(user_id, query.params()).await?;
    Ok(JSendPaginated::page(page, query.limit, query.offset))
}
