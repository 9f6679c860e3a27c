// SPDX-License-Identifier: MIT

//! Workflow state - the single mutable record threaded through the graph
//!
//! A [WorkflowState] is created once per incoming query, flows linearly
//! through the nodes, and is discarded after the terminal state is
//! reported. It is never shared or reused across queries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::schemas::{ChatAnswer, CrawlAnswer, RetrievalAnswer};
use crate::error::WorkflowError;

/// The classified category of a query.
///
/// A closed set: the router matches exhaustively over these three variants,
/// so a fourth value is unrepresentable once deserialization succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Chat,
    Retrieval,
    CrawlWeb,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Chat => "chat",
            Intent::Retrieval => "retrieval",
            Intent::CrawlWeb => "crawl_web",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nodes of the workflow graph, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeName {
    IntentDetection,
    Chat,
    Retrieval,
    CrawlWeb,
    FinalSynthesis,
}

impl NodeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeName::IntentDetection => "intent_detection",
            NodeName::Chat => "chat",
            NodeName::Retrieval => "retrieval",
            NodeName::CrawlWeb => "crawl_web",
            NodeName::FinalSynthesis => "final_synthesis",
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of whichever branch ran. Exactly one branch executes per run.
#[derive(Debug, Clone)]
pub enum BranchResult {
    Chat(ChatAnswer),
    Retrieval(RetrievalAnswer),
    CrawlWeb(CrawlAnswer),
}

impl BranchResult {
    /// The branch's synthesized text, before final synthesis
    pub fn response_text(&self) -> &str {
        match self {
            BranchResult::Chat(answer) => &answer.response_text,
            BranchResult::Retrieval(answer) => &answer.response_text,
            BranchResult::CrawlWeb(answer) => &answer.response_text,
        }
    }
}

/// The single mutable record threaded through one run of the graph
#[derive(Debug, Clone)]
pub struct WorkflowState {
    /// Run identifier for log correlation
    pub run_id: Uuid,
    /// The user's question. Immutable once set, never empty.
    pub query: String,
    /// Caller-supplied background text (wallet history, prior turns)
    pub context: String,

    /// Set once by intent detection; `None` models the unset state
    pub intent: Option<Intent>,
    pub intent_confidence: f32,
    pub intent_reasoning: String,
    /// Extracted search keywords, only meaningful for retrieval
    pub search_query: Option<String>,
    /// Extracted URL, only meaningful for crawl_web
    pub target_url: Option<String>,

    /// Populated by whichever branch ran
    pub branch_result: Option<BranchResult>,

    /// Terminal fields, populated only by final synthesis
    pub final_response: String,
    pub sources: Vec<String>,
    pub confidence: f32,

    metadata: Map<String, Value>,
}

impl WorkflowState {
    /// Create the initial state for one run. The query must be non-empty.
    pub fn new(
        query: impl Into<String>,
        context: impl Into<String>,
    ) -> Result<Self, WorkflowError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(WorkflowError::EmptyQuery);
        }
        Ok(Self {
            run_id: Uuid::new_v4(),
            query,
            context: context.into(),
            intent: None,
            intent_confidence: 0.0,
            intent_reasoning: String::new(),
            search_query: None,
            target_url: None,
            branch_result: None,
            final_response: String::new(),
            sources: Vec::new(),
            confidence: 0.0,
            metadata: Map::new(),
        })
    }

    /// Context text for prompt building, with a placeholder when absent
    pub fn context_or_default(&self) -> &str {
        if self.context.is_empty() {
            "No context provided"
        } else {
            &self.context
        }
    }

    /// Record a diagnostic annotation.
    ///
    /// Annotations accumulate across nodes: a later node never clears an
    /// earlier node's keys, it can only overwrite the same key.
    pub fn annotate(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Accumulated diagnostic annotations
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Completeness check for the terminal state
    pub fn ensure_terminal(&self) -> Result<(), WorkflowError> {
        if self.intent.is_none() {
            return Err(WorkflowError::IncompleteTerminal("intent"));
        }
        if self.branch_result.is_none() {
            return Err(WorkflowError::IncompleteTerminal("branch_result"));
        }
        if self.final_response.is_empty() {
            return Err(WorkflowError::IncompleteTerminal("final_response"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            WorkflowState::new("   ", ""),
            Err(WorkflowError::EmptyQuery)
        ));
    }

    #[test]
    fn test_initial_state_is_unset() {
        let state = WorkflowState::new("What is Solana?", "").unwrap();

        assert!(state.intent.is_none());
        assert!(state.branch_result.is_none());
        assert!(state.final_response.is_empty());
        assert_eq!(state.context_or_default(), "No context provided");
    }

    #[test]
    fn test_annotations_accumulate() {
        let mut state = WorkflowState::new("q", "").unwrap();

        state.annotate("intent_confidence", json!(0.9));
        state.annotate("documents_retrieved", json!(2));
        state.annotate("intent_confidence", json!(0.8));

        assert_eq!(state.metadata().len(), 2);
        assert_eq!(state.metadata()["intent_confidence"], json!(0.8));
        assert_eq!(state.metadata()["documents_retrieved"], json!(2));
    }

    #[test]
    fn test_ensure_terminal_reports_first_missing_field() {
        let mut state = WorkflowState::new("q", "").unwrap();
        assert!(matches!(
            state.ensure_terminal(),
            Err(WorkflowError::IncompleteTerminal("intent"))
        ));

        state.intent = Some(Intent::Chat);
        assert!(matches!(
            state.ensure_terminal(),
            Err(WorkflowError::IncompleteTerminal("branch_result"))
        ));
    }

    #[test]
    fn test_intent_serialization_round_trip() {
        let json = serde_json::to_string(&Intent::CrawlWeb).unwrap();
        assert_eq!(json, "\"crawl_web\"");

        let parsed: Intent = serde_json::from_str("\"retrieval\"").unwrap();
        assert_eq!(parsed, Intent::Retrieval);
    }

    #[test]
    fn test_unknown_intent_rejected() {
        assert!(serde_json::from_str::<Intent>("\"summarize\"").is_err());
    }
}
