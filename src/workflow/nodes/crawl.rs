// SPDX-License-Identifier: MIT

//! Crawl branch - fetch a web page and synthesize a summary
//!
//! A missing URL skips the crawl and the model call entirely. A failed or
//! empty crawl still goes through synthesis over the failure explanation;
//! the success flag reflects the observed fetch outcome, not the model's
//! self-report.

use serde_json::json;
use url::Url;

use crate::crawl::Crawler;
use crate::error::WorkflowError;
use crate::provider::ProviderGateway;
use crate::workflow::prompts;
use crate::workflow::schemas::CrawlAnswer;
use crate::workflow::state::{BranchResult, NodeName, WorkflowState};

/// Crawled content is truncated to this budget to bound prompt size
const CONTENT_BUDGET: usize = 4000;

pub async fn respond(
    gateway: &ProviderGateway,
    crawler: &dyn Crawler,
    state: &mut WorkflowState,
) -> Result<(), WorkflowError> {
    let Some(url) = state.target_url.clone() else {
        log::warn!("Crawl: no URL provided, skipping");
        state.annotate("crawl_success", json!(false));
        state.branch_result = Some(BranchResult::CrawlWeb(CrawlAnswer::no_url()));
        return Ok(());
    };

    let (content, fetched) = fetch_page(crawler, &url).await;

    let prompt = prompts::crawl_synthesis(state.context_or_default(), &state.query, &url, &content);

    let mut answer: CrawlAnswer =
        gateway
            .invoke(&prompt)
            .await
            .map_err(|source| WorkflowError::Provider {
                node: NodeName::CrawlWeb.as_str(),
                source,
            })?;

    answer.crawl_success = fetched && answer.crawl_success;
    if answer.source_url.is_empty() {
        answer.source_url = url.clone();
    }

    state.annotate("crawl_success", json!(answer.crawl_success));
    state.annotate("key_points", json!(answer.key_points.clone()));
    state.branch_result = Some(BranchResult::CrawlWeb(answer));

    Ok(())
}

/// Fetch the page content, absorbing every collaborator-level failure into
/// an explanatory text plus a failed flag.
async fn fetch_page(crawler: &dyn Crawler, url: &str) -> (String, bool) {
    if Url::parse(url).is_err() {
        log::warn!("Crawl: '{}' is not a valid URL", url);
        return (
            format!("Error crawling the URL: '{}' is not a valid URL.", url),
            false,
        );
    }

    match crawler.crawl(url).await {
        Ok(documents) if documents.is_empty() => {
            ("Failed to retrieve content from the URL.".to_string(), false)
        }
        Ok(documents) => {
            let doc = &documents[0];
            let content = if doc.markdown.is_empty() {
                &doc.html
            } else {
                &doc.markdown
            };
            (truncate_content(content), true)
        }
        Err(e) => {
            log::error!("Crawl failed for {}: {}", url, e);
            (format!("Error crawling the URL: {}", e), false)
        }
    }
}

fn truncate_content(content: &str) -> String {
    if content.len() <= CONTENT_BUDGET {
        return content.to_string();
    }
    let mut end = CONTENT_BUDGET;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n\n[Content truncated...]", &content[..end])
}
