mod google_books;

pub use google_books::GoogleBooksLookup;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Request(String),
    #[error("Unexpected lookup response: {0}")]
    Response(String),
}

/// Resolves a book title to its author(s). An unknown title yields an empty string.
#[async_trait]
pub trait AuthorLookup: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<String, LookupError>;
}

/// Lookup that never resolves an author
#[derive(Debug, Clone, Default)]
pub struct DisabledLookup;

#[async_trait]
impl AuthorLookup for DisabledLookup {
    async fn lookup(&self, _title: &str) -> Result<String, LookupError> {
        Ok(String::new())
    }
}
