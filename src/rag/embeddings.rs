// SPDX-License-Identifier: MIT

//! Ollama embedding client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::EmbeddingClient;
use crate::config::EmbeddingConfig;
use crate::error::{CollaboratorError, SolaiError};

/// Client for fetching embeddings from a remote Ollama endpoint
pub struct OllamaEmbeddings {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbeddings {
    pub fn new(config: &EmbeddingConfig, timeout: Duration) -> Result<Self, SolaiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let body = json!({ "model": self.model, "input": text });

        let resp = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::api("ollama", status, text));
        }

        let data: Value = resp.json().await?;

        // Ollama returns {"embeddings": [[...]]}, take the first element
        let embedding = data["embeddings"]
            .as_array()
            .and_then(|e| e.first())
            .and_then(|e| e.as_array())
            .ok_or_else(|| CollaboratorError::invalid("ollama", "missing embeddings in response"))?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect();

        Ok(embedding)
    }
}
