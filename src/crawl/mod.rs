// SPDX-License-Identifier: MIT

//! Page-crawl collaborator
//!
//! An empty document list signals crawl failure; implementations never let
//! transport errors escape to the engine as anything but [CollaboratorError],
//! which the crawl branch absorbs into a degraded result.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::FirecrawlConfig;
use crate::error::{CollaboratorError, SolaiError};

/// A crawled page. Markdown is the primary content representation.
#[derive(Debug, Clone)]
pub struct CrawledDocument {
    pub markdown: String,
    pub html: String,
    pub metadata: Value,
    pub url: String,
}

/// Single-URL page crawling
#[async_trait]
pub trait Crawler: Send + Sync {
    async fn crawl(&self, url: &str) -> Result<Vec<CrawledDocument>, CollaboratorError>;
}

/// Firecrawl scrape API client (single-page mode)
pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(config: &FirecrawlConfig, timeout: Duration) -> Result<Self, SolaiError> {
        if config.api_key.is_empty() {
            return Err(SolaiError::config(
                "firecrawl.api_key (or FIRECRAWL_API_KEY) must be set",
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Crawler for FirecrawlClient {
    async fn crawl(&self, url: &str) -> Result<Vec<CrawledDocument>, CollaboratorError> {
        log::info!("Crawling URL: {}", url);

        let body = json!({ "url": url, "formats": ["markdown", "html"] });

        let resp = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::api("firecrawl", status, text));
        }

        let data: Value = resp.json().await?;
        let page = &data["data"];

        let markdown = page["markdown"].as_str().unwrap_or_default().to_string();
        let html = page["html"].as_str().unwrap_or_default().to_string();

        if markdown.is_empty() && html.is_empty() {
            // Nothing usable came back; empty vec is the failure signal
            return Ok(Vec::new());
        }

        Ok(vec![CrawledDocument {
            markdown,
            html,
            metadata: page.get("metadata").cloned().unwrap_or(Value::Null),
            url: url.to_string(),
        }])
    }
}
