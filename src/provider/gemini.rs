// SPDX-License-Identifier: MIT

//! Gemini provider - Google's Gemini API in JSON mode

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{GenerationParams, StructuredProvider};
use crate::config::GeminiConfig;
use crate::error::{ProviderFailure, SolaiError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini model with schema-constrained JSON output
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model_name: String,
    params: GenerationParams,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, SolaiError> {
        if config.api_key.is_empty() {
            return Err(SolaiError::config(
                "gemini.api_key (or GOOGLE_API_KEY) must be set",
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model_name: config.model_name.clone(),
            params: GenerationParams {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }
}

#[async_trait]
impl StructuredProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn invoke_raw(
        &self,
        schema_name: &'static str,
        schema: &Value,
        prompt: &str,
    ) -> Result<Value, ProviderFailure> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            BASE_URL, self.model_name, self.api_key
        );

        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ],
            "generationConfig": {
                "temperature": self.params.temperature,
                "maxOutputTokens": self.params.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        log::debug!("Gemini request for schema {}", schema_name);

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderFailure::api("gemini", status, text));
        }

        let resp_json: Value = resp.json().await?;

        let candidate = resp_json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ProviderFailure::schema(schema_name, "no candidates in response"))?;

        if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            if finish_reason == "SAFETY" {
                return Err(ProviderFailure::api(
                    "gemini",
                    200,
                    "response blocked by safety filters",
                ));
            }
        }

        let text = candidate["content"]["parts"]
            .as_array()
            .and_then(|p| p.first())
            .and_then(|p| p["text"].as_str())
            .ok_or_else(|| ProviderFailure::schema(schema_name, "no text part in candidate"))?;

        serde_json::from_str(text).map_err(|e| {
            ProviderFailure::schema(schema_name, format!("candidate is not valid JSON: {}", e))
        })
    }
}
