mod local;
mod openai;

pub use local::LocalGenerator;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use thiserror::Error;

/// Topics generated for a new book
pub const MAX_TOPICS: usize = 2;
/// Keywords generated per pick
pub const KEYWORDS_PER_PICK: usize = 5;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator request failed: {0}")]
    Request(String),
    #[error("Unexpected generator response: {0}")]
    Response(String),
}

/// Text understanding used to tag new books and to enrich picks for search.
/// Labels and keywords come back lower-cased.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Up to [`MAX_TOPICS`] broad disciplines the text belongs to
    async fn topics(&self, text: &str) -> Result<Vec<String>, GeneratorError>;
    /// Search keywords describing the text
    async fn keywords(&self, text: &str) -> Result<Vec<String>, GeneratorError>;
}

/// Lower-case, collapse separators and drop empties and duplicates.
pub(crate) fn normalize_labels(raw: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in raw {
        let label = label
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
        if labels.len() == limit {
            break;
        }
    }
    labels
}
