// SPDX-License-Identifier: MIT

//! Pinecone vector index - thin REST wrapper for query and upsert

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::ingest::IndexableChunk;
use super::{ScoredDocument, VectorSearch};
use crate::config::VectorDbConfig;
use crate::error::{CollaboratorError, SolaiError};

/// Pinecone supports up to 100 vectors per upsert request
const UPSERT_BATCH_SIZE: usize = 100;

/// Thin wrapper around Pinecone similarity search
pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_host: String,
    top_k: usize,
}

impl PineconeStore {
    pub fn new(config: &VectorDbConfig, timeout: Duration) -> Result<Self, SolaiError> {
        if config.api_key.is_empty() {
            return Err(SolaiError::config(
                "rag.vector_db.api_key (or PINECONE_API_KEY) must be set",
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            index_host: config.index_host.trim_end_matches('/').to_string(),
            top_k: config.top_k_results,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CollaboratorError> {
        let resp = self
            .client
            .post(format!("{}{}", self.index_host, path))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::api("pinecone", status, text));
        }

        Ok(resp.json().await?)
    }

    /// Upsert chunks with their embeddings, batched
    pub async fn upsert_documents(
        &self,
        chunks: &[IndexableChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize, CollaboratorError> {
        if chunks.len() != embeddings.len() {
            return Err(CollaboratorError::invalid(
                "pinecone",
                format!(
                    "mismatch: {} chunks vs {} embeddings",
                    chunks.len(),
                    embeddings.len()
                ),
            ));
        }

        let vectors: Vec<Value> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                json!({
                    "id": chunk.id,
                    "values": embedding,
                    "metadata": {
                        // Pinecone metadata size limit
                        "text": truncated(&chunk.text, 1000),
                        "source": chunk.source_label(),
                        "source_url": chunk.source_url,
                    }
                })
            })
            .collect();

        let mut upserted = 0;
        for batch in vectors.chunks(UPSERT_BATCH_SIZE) {
            self.post("/vectors/upsert", &json!({ "vectors": batch }))
                .await?;
            upserted += batch.len();
        }

        Ok(upserted)
    }

    /// Delete all vectors originating from a source URL
    pub async fn delete_by_source(&self, source_url: &str) -> Result<(), CollaboratorError> {
        self.post(
            "/vectors/delete",
            &json!({ "filter": { "source_url": { "$eq": source_url } } }),
        )
        .await?;
        Ok(())
    }
}

fn truncated(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
impl VectorSearch for PineconeStore {
    async fn search(&self, vector: &[f32]) -> Result<Vec<ScoredDocument>, CollaboratorError> {
        let body = json!({
            "vector": vector,
            "topK": self.top_k,
            "includeMetadata": true
        });

        let data = self.post("/query", &body).await?;

        let matches = data["matches"].as_array().cloned().unwrap_or_default();

        let documents = matches
            .into_iter()
            .map(|m| {
                let metadata = m.get("metadata").cloned().unwrap_or(Value::Null);
                let source = metadata["source"]
                    .as_str()
                    .or_else(|| metadata["source_url"].as_str())
                    .unwrap_or("Unknown")
                    .to_string();
                ScoredDocument {
                    id: m["id"].as_str().unwrap_or_default().to_string(),
                    text: metadata["text"].as_str().unwrap_or_default().to_string(),
                    score: m["score"].as_f64().unwrap_or(0.0) as f32,
                    source,
                    metadata,
                }
            })
            .collect();

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncated(text, 2);
        // 'é' starts at byte 1 and is two bytes wide
        assert_eq!(cut, "h");
    }

    #[test]
    fn test_truncated_short_text_untouched() {
        assert_eq!(truncated("abc", 1000), "abc");
    }
}
