//! bookpicks - Books of highlighted excerpts ("picks"), tagged and searchable
//!
//! This crate provides:
//! - A book aggregate service keeping pick indexes contiguous across inserts,
//!   deletes, reorders and clones
//! - redb embedded database for all aggregate tables (ACID, MVCC, crash-safe)
//! - Asynchronous keyword enrichment through a transactional outbox
//! - REST API with JSend envelopes

pub mod api;
pub mod config;
pub mod enrichment;
pub mod generator;
pub mod lookup;
pub mod service;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use service::BookService;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub service: Arc<BookService>,
}
