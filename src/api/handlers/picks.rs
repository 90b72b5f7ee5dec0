use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::books::default_limit;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated, UserId};
use crate::service::{DeleteOutcome, ListPicksParams, PickPatch, PickView, SortOrder};
use crate::storage::models::Patch;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdatePickRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListPicksQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub until_pick: Option<Uuid>,
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_picks(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(book_id): Path<Uuid>,
    AppQuery(query): AppQuery<ListPicksQuery>,
) -> Result<Json<JSendPaginated<PickView>>, ApiError> {
    let page = state
        .service
        .book_picks(
            user_id,
            book_id,
            ListPicksParams {
                offset: query.offset as usize,
                limit: query.limit as usize,
                order: query.order,
                until_pick: query.until_pick,
            },
        )
        .await?;
    Ok(JSendPaginated::page(page, query.limit, query.offset))
}

pub async fn update_pick(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path((book_id, pick_id)): Path<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdatePickRequest>,
) -> Result<Json<JSend<PickView>>, ApiError> {
    let patch = PickPatch {
        content: req.content,
        content_text: req.content_text,
        title: Patch::from(req.title),
    };
    if patch.is_empty() {
        return Err(ApiError::bad_request(
            "at least one field (content, content_text, title) must be provided",
        ));
    }

    let pick = state.service.edit_pick(user_id, book_id, pick_id, patch).await?;

    tracing::debug!(%book_id, %pick_id, "Updated pick");
    Ok(JSend::success(pick))
}

pub async fn delete_pick(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path((book_id, pick_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<JSend<DeleteOutcome>>, ApiError> {
    let outcome = state.service.delete_pick(user_id, book_id, pick_id).await?;
    Ok(JSend::success(outcome))
}
