// SPDX-License-Identifier: MIT

//! Cerebras provider - OpenAI-compatible chat completions API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{GenerationParams, StructuredProvider};
use crate::config::CerebrasConfig;
use crate::error::{ProviderFailure, SolaiError};

/// Cerebras inference API client with JSON-schema constrained output
pub struct CerebrasProvider {
    client: Client,
    api_key: String,
    model_name: String,
    endpoint: String,
    params: GenerationParams,
}

impl CerebrasProvider {
    pub fn new(config: &CerebrasConfig) -> Result<Self, SolaiError> {
        if config.api_key.is_empty() {
            return Err(SolaiError::config(
                "cerebras.api_key (or CEREBRAS_API_KEY) must be set",
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model_name: config.model_name.clone(),
            endpoint: config.endpoint_url.trim_end_matches('/').to_string(),
            params: GenerationParams::default(),
        })
    }
}

#[async_trait]
impl StructuredProvider for CerebrasProvider {
    fn name(&self) -> &'static str {
        "cerebras"
    }

    async fn invoke_raw(
        &self,
        schema_name: &'static str,
        schema: &Value,
        prompt: &str,
    ) -> Result<Value, ProviderFailure> {
        let body = json!({
            "model": self.model_name,
            "messages": [
                { "role": "system", "content": prompt }
            ],
            "temperature": self.params.temperature,
            "max_tokens": self.params.max_output_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema
                }
            }
        });

        log::debug!("Cerebras request for schema {}", schema_name);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderFailure::api("cerebras", status, text));
        }

        let resp_json: Value = resp.json().await?;

        let content = resp_json["choices"]
            .as_array()
            .and_then(|c| c.first())
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| {
                ProviderFailure::schema(schema_name, "no message content in completion")
            })?;

        serde_json::from_str(content).map_err(|e| {
            ProviderFailure::schema(schema_name, format!("completion is not valid JSON: {}", e))
        })
    }
}
