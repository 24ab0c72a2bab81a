//! Error types for mlchat
//!
//! The two collaborator failures (`IndexUnavailable`, `Completion`) are the
//! ones the query pipeline converts into visible assistant turns. The rest
//! are plumbing errors raised while loading config or building clients.

use thiserror::Error;

/// Main error type for the chat pipeline and its collaborators
#[derive(Error, Debug)]
pub enum ChatError {
    /// Vector store could not be opened or queried
    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// Hosted model call failed (transport, auth, quota, provider-side).
    /// Displays as the bare cause so the pipeline can prefix it verbatim.
    #[error("{cause}")]
    Completion { cause: String },

    /// Search called with an empty query or zero depth
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Query embedding failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Which side of a turn failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Index,
    Completion,
    Other,
}

impl ChatError {
    /// Shorthand for a completion failure
    pub fn completion(cause: impl Into<String>) -> Self {
        ChatError::Completion { cause: cause.into() }
    }

    /// Classify the error for turn outcomes and logging
    pub fn kind(&self) -> FailureKind {
        match self {
            ChatError::IndexUnavailable(_) | ChatError::Embedding(_) => FailureKind::Index,
            ChatError::Completion { .. } => FailureKind::Completion,
            _ => FailureKind::Other,
        }
    }
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Convert anyhow errors raised by embedding/model loading
impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        ChatError::Embedding(format!("{:#}", err))
    }
}
