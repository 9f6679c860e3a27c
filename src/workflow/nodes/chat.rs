// SPDX-License-Identifier: MIT

//! Direct chat branch - answers from model knowledge alone

use serde_json::json;

use crate::error::WorkflowError;
use crate::provider::ProviderGateway;
use crate::workflow::prompts;
use crate::workflow::schemas::ChatAnswer;
use crate::workflow::state::{BranchResult, NodeName, WorkflowState};

/// Generate a direct conversational response. No collaborators are
/// involved; the only failure path is the provider call itself.
pub async fn respond(
    gateway: &ProviderGateway,
    state: &mut WorkflowState,
) -> Result<(), WorkflowError> {
    let prompt = prompts::chat_response(state.context_or_default(), &state.query);

    let answer: ChatAnswer =
        gateway
            .invoke(&prompt)
            .await
            .map_err(|source| WorkflowError::Provider {
                node: NodeName::Chat.as_str(),
                source,
            })?;

    state.annotate("tone", json!(answer.tone));
    if let Some(suggestions) = &answer.follow_up_suggestions {
        state.annotate("follow_up_suggestions", json!(suggestions));
    }
    state.branch_result = Some(BranchResult::Chat(answer));

    Ok(())
}
