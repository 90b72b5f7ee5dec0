use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Books
        .route("/books", get(handlers::list_books))
        .route("/books/short", get(handlers::short_books))
        .route("/books/picks", post(handlers::create_pick))
        .route("/books/save", post(handlers::save_book))
        .route("/books/:book_id", get(handlers::get_book))
        .route("/books/:book_id", put(handlers::update_book))
        .route("/books/:book_id", delete(handlers::delete_book))
        // Picks
        .route("/books/:book_id/picks", get(handlers::list_picks))
        .route("/books/:book_id/picks/:pick_id", put(handlers::update_pick))
        .route("/books/:book_id/picks/:pick_id", delete(handlers::delete_pick))
        // Search and topics
        .route("/books/:book_id/search", get(handlers::search_book))
        .route("/search", get(handlers::search_library))
        .route("/topics", get(handlers::list_topics))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled, purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
