//! Book aggregate service.
//!
//! Every mutating operation runs its database work inside a single write
//! transaction (see [`Database::write`]). redb serializes writers, so index
//! shifts and reorders never interleave. Calls to the text generator and the
//! author lookup happen before the transaction opens; enrichment messages are
//! written to the outbox inside it and relayed to the queue after commit.

mod clone;
mod create;
mod delete;
mod edit;
mod error;
mod keywords;
mod read;
mod search;
pub mod similarity;
mod tagging;
mod types;

pub use error::ServiceError;
pub use tagging::{Palette, DEFAULT_PALETTE};
pub use types::*;

use std::sync::Arc;

use crate::enrichment::EnrichmentQueue;
use crate::generator::TextGenerator;
use crate::lookup::AuthorLookup;
use crate::storage::models::EnrichmentMessage;
use crate::storage::Database;

/// Tunables of the aggregate
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Minimum edit distance, in percent of the longer text, that makes a pick
    /// edit request fresh keywords
    pub change_threshold_percent: f64,
    /// Number of most recent picks embedded in a book view
    pub recent_picks: usize,
    /// Outbox entries relayed per sweep
    pub relay_batch: usize,
    pub palette: Palette,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            change_threshold_percent: 20.0,
            recent_picks: 3,
            relay_batch: 100,
            palette: Palette::default(),
        }
    }
}

pub struct BookService {
    db: Database,
    queue: Arc<dyn EnrichmentQueue>,
    generator: Arc<dyn TextGenerator>,
    lookup: Arc<dyn AuthorLookup>,
    config: ServiceConfig,
}

impl BookService {
    pub fn new(
        db: Database,
        queue: Arc<dyn EnrichmentQueue>,
        generator: Arc<dyn TextGenerator>,
        lookup: Arc<dyn AuthorLookup>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            queue,
            generator,
            lookup,
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Outbox entries written by a transaction, to relay once it has committed
type Pending = Vec<(u64, EnrichmentMessage)>;
