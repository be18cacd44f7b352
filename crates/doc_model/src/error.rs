//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid range: [{start}, {end})")]
    InvalidRange { start: usize, end: usize },

    #[error("Header not found: {0}")]
    HeaderNotFound(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
