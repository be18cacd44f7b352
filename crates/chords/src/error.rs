//! Error types for chord and key parsing

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChordError {
    #[error("Invalid chord symbol: {0}")]
    InvalidChord(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("No chords found in text")]
    NoChordsFound,
}

pub type Result<T> = std::result::Result<T, ChordError>;
