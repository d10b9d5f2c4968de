use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for scoring and extraction operations.
pub type Result<T> = std::result::Result<T, NewsCheckError>;

#[derive(Error, Debug)]
pub enum NewsCheckError {
    #[error("Empty input: nothing to score")]
    EmptyInput,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Extraction failed: no strategy produced article text for {0}")]
    ExtractionFailure(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NewsCheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsCheckError::EmptyInput | NewsCheckError::InvalidUrl(_) => ErrorKind::InvalidInput,
            NewsCheckError::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            NewsCheckError::ExtractionFailure(_) => ErrorKind::ExtractionFailure,
            NewsCheckError::Fetch(_) => ErrorKind::Fetch,
            NewsCheckError::Lexicon(_) | NewsCheckError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Coarse error category reported alongside batch items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ModelUnavailable,
    InvalidInput,
    ExtractionFailure,
    Fetch,
    Config,
}

/// Errors from the HTML fetch collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timeout (>{secs}s): {url}")]
    Timeout { url: String, secs: u64 },

    #[error("Connection error for {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body from {url}: {reason}")]
    Body { url: String, reason: String },
}
