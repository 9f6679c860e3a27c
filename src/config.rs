// SPDX-License-Identifier: MIT

//! YAML configuration loading
//!
//! The config file path comes from `SOLAI_CONFIG_PATH`, falling back to
//! `config.yml` in the working directory. API keys can be overridden from
//! the environment so secrets stay out of the file.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::SolaiError;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm_processor: LlmProcessorConfig,
}

/// Configuration for the workflow engine and its collaborators
#[derive(Debug, Clone, Deserialize)]
pub struct LlmProcessorConfig {
    /// Primary provider: "CEREBRAS" or "GEMINI"
    pub provider: String,
    pub cerebras: CerebrasConfig,
    pub gemini: GeminiConfig,
    pub rag: RagConfig,
    pub ollama_embedding: EmbeddingConfig,
    pub firecrawl: FirecrawlConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CerebrasConfig {
    #[serde(default)]
    pub api_key: String,
    pub model_name: String,
    pub endpoint_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    pub enabled: bool,
    pub vector_db: VectorDbConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorDbConfig {
    #[serde(default)]
    pub api_key: String,
    /// Full https host of the serverless index
    pub index_host: String,
    #[serde(default = "default_top_k")]
    pub top_k_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirecrawlConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_firecrawl_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

/// Per-call time budgets so one slow dependency cannot stall a run
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Structured-output model calls
    #[serde(default = "default_provider_secs")]
    pub provider_secs: u64,
    /// Embedding, search, crawl, and indexer calls
    #[serde(default = "default_collaborator_secs")]
    pub collaborator_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_secs: default_provider_secs(),
            collaborator_secs: default_collaborator_secs(),
        }
    }
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_top_k() -> usize {
    5
}

fn default_firecrawl_base_url() -> String {
    "https://api.firecrawl.dev".to_string()
}

fn default_provider_secs() -> u64 {
    30
}

fn default_collaborator_secs() -> u64 {
    20
}

impl Config {
    /// Load from `SOLAI_CONFIG_PATH`, falling back to `config.yml`
    pub fn load() -> Result<Self, SolaiError> {
        let path = env::var("SOLAI_CONFIG_PATH").unwrap_or_else(|_| "config.yml".to_string());
        Self::from_path(Path::new(&path))
    }

    /// Load and validate a config file
    pub fn from_path(path: &Path) -> Result<Self, SolaiError> {
        if !path.exists() {
            return Err(SolaiError::config(format!(
                "Config file not found at {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse config from a YAML string
    pub fn from_yaml(raw: &str) -> Result<Self, SolaiError> {
        let mut config: Config = serde_yaml::from_str(raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SolaiError> {
        match self.llm_processor.provider.as_str() {
            "CEREBRAS" | "GEMINI" => Ok(()),
            other => Err(SolaiError::config(format!(
                "llm_processor.provider must be CEREBRAS or GEMINI, got '{}'",
                other
            ))),
        }
    }

    fn apply_env_overrides(&mut self) {
        let llm = &mut self.llm_processor;
        if let Ok(key) = env::var("CEREBRAS_API_KEY") {
            llm.cerebras.api_key = key;
        }
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            llm.gemini.api_key = key;
        }
        if let Ok(key) = env::var("PINECONE_API_KEY") {
            llm.rag.vector_db.api_key = key;
        }
        if let Ok(key) = env::var("FIRECRAWL_API_KEY") {
            llm.firecrawl.api_key = key;
        }
    }
}
