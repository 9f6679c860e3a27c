// SPDX-License-Identifier: MIT

//! Intent-detection node

use serde_json::json;

use crate::error::WorkflowError;
use crate::provider::ProviderGateway;
use crate::workflow::prompts;
use crate::workflow::schemas::IntentDetection;
use crate::workflow::state::{NodeName, WorkflowState};

/// Classify the query and record the classifier outputs on the state.
///
/// The classifier is authoritative: the engine checks only that the label
/// deserialized into one of the three enumerated intents, never its
/// semantic correctness.
pub async fn classify(
    gateway: &ProviderGateway,
    state: &mut WorkflowState,
) -> Result<(), WorkflowError> {
    let prompt = prompts::intent_detection(state.context_or_default(), &state.query);

    let detection: IntentDetection =
        gateway
            .invoke(&prompt)
            .await
            .map_err(|source| WorkflowError::Provider {
                node: NodeName::IntentDetection.as_str(),
                source,
            })?;

    log::info!(
        "Intent detected: {} (confidence: {:.2})",
        detection.intent,
        detection.confidence
    );

    state.intent = Some(detection.intent);
    state.intent_confidence = detection.confidence;
    state.intent_reasoning = detection.reasoning;
    state.search_query = detection.search_query;
    state.target_url = detection.url;
    state.annotate("intent_confidence", json!(detection.confidence));

    Ok(())
}
