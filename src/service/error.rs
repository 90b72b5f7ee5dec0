use thiserror::Error;

use crate::enrichment::QueueError;
use crate::generator::GeneratorError;
use crate::storage::DatabaseError;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an aggregate operation. `Internal` keeps its cause as the error
/// source for logging but never renders it.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced book or pick is absent or owned by someone else
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error")]
    Internal(#[source] Source),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(e: DatabaseError) -> Self {
        ServiceError::Internal(Box::new(e))
    }
}

impl From<GeneratorError> for ServiceError {
    fn from(e: GeneratorError) -> Self {
        ServiceError::Internal(Box::new(e))
    }
}

impl From<QueueError> for ServiceError {
    fn from(e: QueueError) -> Self {
        ServiceError::Internal(Box::new(e))
    }
}
