//! Shared test helpers for in-crate handler tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{Config, ServerConfig};
use crate::enrichment::{self, EnrichmentMessage};
use crate::generator::LocalGenerator;
use crate::lookup::DisabledLookup;
use crate::service::BookService;
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState with a temporary database, the local generator and
/// no author lookup. The returned receiver sees every relayed enrichment message.
pub fn test_state(
    temp_dir: &tempfile::TempDir,
) -> (Arc<AppState>, mpsc::Receiver<EnrichmentMessage>) {
    let data_dir = temp_dir.path().join("data");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        },
        test_mode: true,
        ..Config::default()
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let (queue, receiver) = enrichment::channel(64);
    let service = BookService::new(
        db.clone(),
        Arc::new(queue),
        Arc::new(LocalGenerator::new()),
        Arc::new(DisabledLookup),
        config.service_config(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        service: Arc::new(service),
    });
    (state, receiver)
}
