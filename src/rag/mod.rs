// SPDX-License-Identifier: MIT

//! Retrieval collaborators - embedding generation and vector search
//!
//! The workflow consumes these through narrow traits; implementations are
//! thin HTTP adapters:
//! - [embeddings::OllamaEmbeddings] - remote Ollama embedding endpoint
//! - [vector_store::PineconeStore] - Pinecone REST index

pub mod embeddings;
pub mod ingest;
pub mod vector_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorError;

/// A document returned by vector search
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub id: String,
    pub text: String,
    pub score: f32,
    /// Human-readable source label (name or URL)
    pub source: String,
    pub metadata: Value,
}

/// Embedding generation for query text.
///
/// Vector dimensionality is agreed out-of-band with the search index.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;
}

/// Vector-similarity search over an external index
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Top-k documents by similarity, best first. Length is bounded by the
    /// configured top-k.
    async fn search(&self, vector: &[f32]) -> Result<Vec<ScoredDocument>, CollaboratorError>;
}
