use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub books_deleted: u64,
    pub picks_deleted: u64,
    pub topics_deleted: u64,
    pub keywords_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state.db.purge_all().map_err(|e| {
        tracing::error!(error = %e, "Purge failed");
        ApiError::internal()
    })?;

    tracing::warn!(
        books = stats.books,
        picks = stats.picks,
        topics = stats.topics,
        keywords = stats.keywords,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        books_deleted: stats.books,
        picks_deleted: stats.picks,
        topics_deleted: stats.topics,
        keywords_deleted: stats.keywords,
    }))
}
