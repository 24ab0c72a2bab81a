// Qdrant-backed vector index over the pre-built book collection
use async_trait::async_trait;
use qdrant_client::qdrant::{value::Kind, SearchPointsBuilder, Value as QdrantValue};
use qdrant_client::Qdrant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{validate_query, EmbeddingEngine, VectorIndex};
use crate::errors::{ChatError, Result};
use crate::types::Passage;

/// Connection settings for the book collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantIndexConfig {
    /// gRPC URL of the Qdrant server
    pub url: String,
    /// Collection holding the book chunks
    pub collection: String,
    /// Payload field holding the passage text
    pub text_field: String,
    /// Hugging Face id of the model the collection was embedded with
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl Default for QdrantIndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "chunks".to_string(),
            text_field: "page_content".to_string(),
            embedding_model: super::embedding::DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Vector index that embeds the query locally and searches Qdrant
pub struct QdrantIndex {
    client: Qdrant,
    embedder: Arc<EmbeddingEngine>,
    config: QdrantIndexConfig,
}

impl QdrantIndex {
    /// Open the index: build the client and load the query embedder.
    ///
    /// The collection itself is only touched on search, so a store that goes
    /// away later is reported per turn rather than at startup.
    pub fn open(config: QdrantIndexConfig) -> Result<Self> {
        let client = connect(&config)?;

        let embedder = EmbeddingEngine::load(&config.embedding_model).map_err(|e| {
            ChatError::IndexUnavailable(format!(
                "Failed to load embedding model {}: {:#}",
                config.embedding_model, e
            ))
        })?;

        Ok(Self::with_parts(client, Arc::new(embedder), config))
    }

    /// Assemble from an existing client and embedder
    pub fn with_parts(client: Qdrant, embedder: Arc<EmbeddingEngine>, config: QdrantIndexConfig) -> Self {
        Self {
            client,
            embedder,
            config,
        }
    }

    /// Check that the server answers and the collection exists
    pub async fn check_collection(&self) -> Result<u64> {
        collection_points(&self.client, &self.config).await
    }

    /// Probe the store without loading the embedding model.
    ///
    /// Returns the number of points in the collection.
    pub async fn probe(config: &QdrantIndexConfig) -> Result<u64> {
        let client = connect(config)?;
        collection_points(&client, config).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let text = query.to_string();

        tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| ChatError::Embedding(format!("embedding task failed: {}", e)))?
            .map_err(ChatError::from)
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        validate_query(query, k)?;

        let started = Instant::now();
        let vector = self.embed_query(query).await?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.config.collection, vector, k as u64).with_payload(true),
            )
            .await
            .map_err(|e| ChatError::IndexUnavailable(format!("search failed: {}", e)))?;

        let passages: Vec<Passage> = response
            .result
            .into_iter()
            .filter_map(|point| passage_from_payload(&point.payload, &self.config.text_field, point.score))
            .take(k)
            .collect();

        let scores: Vec<f32> = passages.iter().filter_map(|p| p.score).collect();
        tracing::debug!(
            collection = %self.config.collection,
            k,
            found = passages.len(),
            ?scores,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "vector search complete"
        );

        Ok(passages)
    }

    fn describe(&self) -> String {
        format!("qdrant {} (collection `{}`)", self.config.url, self.config.collection)
    }
}

fn connect(config: &QdrantIndexConfig) -> Result<Qdrant> {
    Qdrant::from_url(&config.url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ChatError::IndexUnavailable(format!("Failed to create Qdrant client: {}", e)))
}

async fn collection_points(client: &Qdrant, config: &QdrantIndexConfig) -> Result<u64> {
    let exists = client
        .collection_exists(config.collection.as_str())
        .await
        .map_err(|e| ChatError::IndexUnavailable(e.to_string()))?;

    if !exists {
        return Err(ChatError::IndexUnavailable(format!(
            "collection `{}` not found at {}",
            config.collection, config.url
        )));
    }

    let info = client
        .collection_info(config.collection.as_str())
        .await
        .map_err(|e| ChatError::IndexUnavailable(e.to_string()))?;

    Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
}

/// Pull the passage text out of a point payload
fn passage_from_payload(
    payload: &HashMap<String, QdrantValue>,
    text_field: &str,
    score: f32,
) -> Option<Passage> {
    let text = payload.get(text_field).and_then(qdrant_value_to_string)?;
    Some(Passage::new(text).with_score(score))
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}
