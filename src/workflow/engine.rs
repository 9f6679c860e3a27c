// SPDX-License-Identifier: MIT

//! Workflow engine - drives the graph to its terminal state
//!
//! `entry -> intent_detection -> {chat | retrieval | crawl_web} ->
//! final_synthesis -> terminal`. The engine itself holds only immutable
//! collaborators and is shared read-only across concurrent runs; all
//! mutable data lives in the per-run [WorkflowState].
//!
//! A provider failure at any node is fatal: the engine does not catch it,
//! later nodes never execute, and no terminal state is produced. Degraded
//! branch results flow to final synthesis like any other.

use std::sync::Arc;

use futures::stream::Stream;

use super::nodes;
use super::router::route;
use super::state::{NodeName, WorkflowState};
use crate::crawl::Crawler;
use crate::error::WorkflowError;
use crate::provider::ProviderGateway;
use crate::rag::{EmbeddingClient, VectorSearch};

pub struct WorkflowEngine {
    gateway: ProviderGateway,
    embeddings: Arc<dyn EmbeddingClient>,
    search: Arc<dyn VectorSearch>,
    crawler: Arc<dyn Crawler>,
}

impl WorkflowEngine {
    pub fn new(
        gateway: ProviderGateway,
        embeddings: Arc<dyn EmbeddingClient>,
        search: Arc<dyn VectorSearch>,
        crawler: Arc<dyn Crawler>,
    ) -> Self {
        Self {
            gateway,
            embeddings,
            search,
            crawler,
        }
    }

    /// Run to completion, returning only the terminal state
    pub async fn execute(&self, mut state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        log::info!("Run {}: starting", state.run_id);

        self.run_node(NodeName::IntentDetection, &mut state).await?;
        let branch = route(state.intent.ok_or(WorkflowError::IntentUnset)?);
        self.run_node(branch, &mut state).await?;
        self.run_node(NodeName::FinalSynthesis, &mut state).await?;

        state.ensure_terminal()?;
        log::info!("Run {}: terminal state reached", state.run_id);
        Ok(state)
    }

    /// Step-streaming execution.
    ///
    /// Yields `(node, state after that node)` for the classifier, the routed
    /// branch, and the synthesizer, in that order: a finite sequence of
    /// exactly three steps, not restartable. Dropping the stream cancels
    /// whichever call is currently in flight and no further nodes execute.
    pub fn execute_streaming(
        &self,
        state: WorkflowState,
    ) -> impl Stream<Item = Result<(NodeName, WorkflowState), WorkflowError>> + Send + '_ {
        enum Cursor {
            Classify,
            Branch,
            Synthesize,
            Done,
        }

        futures::stream::try_unfold((Cursor::Classify, state), move |(cursor, mut state)| async move {
            let (node, next) = match cursor {
                Cursor::Classify => (NodeName::IntentDetection, Cursor::Branch),
                Cursor::Branch => (
                    route(state.intent.ok_or(WorkflowError::IntentUnset)?),
                    Cursor::Synthesize,
                ),
                Cursor::Synthesize => (NodeName::FinalSynthesis, Cursor::Done),
                Cursor::Done => return Ok(None),
            };

            self.run_node(node, &mut state).await?;
            if matches!(next, Cursor::Done) {
                state.ensure_terminal()?;
            }

            Ok(Some(((node, state.clone()), (next, state))))
        })
    }

    async fn run_node(
        &self,
        node: NodeName,
        state: &mut WorkflowState,
    ) -> Result<(), WorkflowError> {
        log::info!("Run {}: executing node {}", state.run_id, node);
        match node {
            NodeName::IntentDetection => nodes::intent::classify(&self.gateway, state).await,
            NodeName::Chat => nodes::chat::respond(&self.gateway, state).await,
            NodeName::Retrieval => {
                nodes::retrieval::respond(
                    &self.gateway,
                    self.embeddings.as_ref(),
                    self.search.as_ref(),
                    state,
                )
                .await
            }
            NodeName::CrawlWeb => {
                nodes::crawl::respond(&self.gateway, self.crawler.as_ref(), state).await
            }
            NodeName::FinalSynthesis => nodes::synthesis::finalize(&self.gateway, state).await,
        }
    }
}
