//! Error types for Quran Search

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuranSearchError {
    #[error("Missing query")]
    MissingQuery,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    #[error("Dataset checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Corpus not ready: {0}")]
    CorpusNotReady(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuranSearchError {
    /// True for errors caused by the caller's input rather than by the service.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingQuery | Self::InvalidQuery(_))
    }
}

impl serde::Serialize for QuranSearchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T, E = QuranSearchError> = std::result::Result<T, E>;
