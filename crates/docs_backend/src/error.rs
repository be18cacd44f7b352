//! Error types for backend calls and service operations

use doc_model::DocumentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a submitted batch. Fatal: the document is
    /// left entirely unchanged, and the caller retries the whole
    /// operation, never the batch alone.
    #[error("Batch rejected: {0}")]
    BatchRejected(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl BackendError {
    /// Only transient read failures are retried; a rejected batch never
    /// is, since retry-after-partial-failure is undefined.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Engine(#[from] sheet_engine::EngineError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
