//! Vector index client
//!
//! Components:
//! - Embedding Engine: local BERT sentence embeddings for the query
//! - Qdrant Index: similarity search over the pre-built book collection
//! - Unavailable Index: stand-in used when the store could not be opened

pub mod embedding;
pub mod qdrant;

use async_trait::async_trait;

use crate::errors::{ChatError, Result};
use crate::types::Passage;

pub use embedding::EmbeddingEngine;
pub use qdrant::{QdrantIndex, QdrantIndexConfig};

/// Read-only similarity search over an externally built index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `k` passages, most similar first.
    ///
    /// Fails with [`ChatError::IndexUnavailable`] when the store cannot be
    /// opened or queried, and [`ChatError::InvalidQuery`] for an empty query
    /// or `k == 0`.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;

    /// Human-readable description (collection and location)
    fn describe(&self) -> String;
}

/// Reject inputs the store must never see
pub fn validate_query(query: &str, k: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(ChatError::InvalidQuery("query must not be empty".to_string()));
    }
    if k == 0 {
        return Err(ChatError::InvalidQuery("k must be at least 1".to_string()));
    }
    Ok(())
}

/// Index that could not be opened at startup.
///
/// Every search fails with the original reason so each turn surfaces it.
#[derive(Debug, Clone)]
pub struct UnavailableIndex {
    reason: String,
}

impl UnavailableIndex {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Stand-in for an index whose `open` failed.
    ///
    /// Keeps only the inner reason so searches report it once.
    pub fn from_error(err: ChatError) -> Self {
        match err {
            ChatError::IndexUnavailable(reason) => Self::new(reason),
            other => Self::new(other.to_string()),
        }
    }
}

#[async_trait]
impl VectorIndex for UnavailableIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        validate_query(query, k)?;
        Err(ChatError::IndexUnavailable(self.reason.clone()))
    }

    fn describe(&self) -> String {
        format!("unavailable ({})", self.reason)
    }
}
