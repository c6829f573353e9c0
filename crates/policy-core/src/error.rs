//! Error types for the policy assistant

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the policy assistant
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Index load error: {0}")]
    IndexLoad(String),

    #[error("Index and mapping are not a matched pair: {0}")]
    ConsistencyViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Coarse failure category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The query could not be embedded
    Embedding,
    /// The index or mapping file could not be loaded
    IndexLoad,
    /// The answer could not be generated
    Generation,
    /// Anything else
    Other,
}

impl Error {
    /// Map this error onto the failure category it belongs to
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Embedding(_) => FailureKind::Embedding,
            Error::IndexLoad(_) | Error::ConsistencyViolation(_) => FailureKind::IndexLoad,
            Error::Generation(_) | Error::Timeout(_) => FailureKind::Generation,
            _ => FailureKind::Other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
