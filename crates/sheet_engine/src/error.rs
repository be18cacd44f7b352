//! Error types for engine passes

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Section index {index} is out of bounds ({count} sections)")]
    SectionOutOfBounds { index: usize, count: usize },

    #[error("Section {0} has no continuous break after metadata")]
    MissingContinuousBreak(usize),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Invalid transpose target: {0}")]
    InvalidTarget(#[from] chords::ChordError),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
