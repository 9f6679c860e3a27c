// SPDX-License-Identifier: MIT

//! Final synthesis node - the single point where the user-visible answer
//! is produced. No branch result is ever surfaced unsynthesized.

use serde_json::json;

use crate::error::WorkflowError;
use crate::provider::ProviderGateway;
use crate::workflow::prompts;
use crate::workflow::schemas::FinalAnswer;
use crate::workflow::state::{BranchResult, NodeName, WorkflowState};

pub async fn finalize(
    gateway: &ProviderGateway,
    state: &mut WorkflowState,
) -> Result<(), WorkflowError> {
    let intent = state.intent.ok_or(WorkflowError::IntentUnset)?;
    let branch = state
        .branch_result
        .as_ref()
        .ok_or(WorkflowError::IncompleteTerminal("branch_result"))?;

    let (processed_content, sources) = branch_sources(branch);

    let prompt = prompts::final_output(
        state.context_or_default(),
        &state.query,
        &processed_content,
        intent,
        &sources.join(", "),
    );

    let answer: FinalAnswer =
        gateway
            .invoke(&prompt)
            .await
            .map_err(|source| WorkflowError::Provider {
                node: NodeName::FinalSynthesis.as_str(),
                source,
            })?;

    state.final_response = answer.response_text;
    state.sources = answer.sources;
    state.confidence = answer.confidence;
    state.annotate("intent_used", json!(answer.intent_used));

    Ok(())
}

/// Intent-specific source list plus the branch's processed content
fn branch_sources(branch: &BranchResult) -> (String, Vec<String>) {
    match branch {
        BranchResult::Chat(answer) => (
            answer.response_text.clone(),
            vec!["AI Assistant Knowledge".to_string()],
        ),
        BranchResult::Retrieval(answer) => {
            (answer.response_text.clone(), answer.sources_used.clone())
        }
        BranchResult::CrawlWeb(answer) => {
            let source = if answer.source_url.is_empty() {
                "No URL provided".to_string()
            } else {
                answer.source_url.clone()
            };
            (answer.response_text.clone(), vec![source])
        }
    }
}
