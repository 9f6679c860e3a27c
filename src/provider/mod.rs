// SPDX-License-Identifier: MIT

//! Provider module - structured-output model calls
//!
//! This module provides the core [StructuredProvider] trait and the
//! fallback [gateway::ProviderGateway] every workflow call goes through.
//! Provider implementations are in their own submodules:
//! - [cerebras] - Cerebras inference API (OpenAI-compatible)
//! - [gemini] - Google's Gemini API

pub mod cerebras;
pub mod gateway;
pub mod gemini;

pub use gateway::ProviderGateway;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderFailure;

/// Generation parameters shared by provider implementations
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 2048,
        }
    }
}

/// A structured-output model call: one named schema, one prompt, one JSON
/// value back.
///
/// Implementations hold only immutable configuration and are safe to share
/// across concurrent runs.
#[async_trait]
pub trait StructuredProvider: Send + Sync {
    /// Provider name, used in logs and error messages
    fn name(&self) -> &'static str;

    /// Invoke the model, constrained to the given JSON schema
    async fn invoke_raw(
        &self,
        schema_name: &'static str,
        schema: &Value,
        prompt: &str,
    ) -> Result<Value, ProviderFailure>;
}

/// Binds an output type to its named JSON schema and value-range contract.
///
/// The gateway decodes every provider response through this trait, so a
/// shape or range violation is caught before a value ever reaches the
/// workflow state.
pub trait StructuredOutput: DeserializeOwned {
    /// Schema name surfaced in provider requests and errors
    const NAME: &'static str;

    /// The JSON Schema handed to schema-constrained providers
    fn json_schema() -> &'static Value;

    /// Contract validation beyond what deserialization enforces
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
