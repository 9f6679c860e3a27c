// SPDX-License-Identifier: MIT

//! Retrieval branch - search the vector index, synthesize over the hits
//!
//! Collaborator failures and empty result sets are not branch failures:
//! synthesis still runs over whatever was retrieved (possibly nothing) and
//! is expected to report low confidence and an incomplete answer.

use serde_json::json;

use crate::error::{CollaboratorError, WorkflowError};
use crate::provider::ProviderGateway;
use crate::rag::{EmbeddingClient, ScoredDocument, VectorSearch};
use crate::workflow::prompts;
use crate::workflow::schemas::RetrievalAnswer;
use crate::workflow::state::{BranchResult, NodeName, WorkflowState};

pub async fn respond(
    gateway: &ProviderGateway,
    embeddings: &dyn EmbeddingClient,
    search: &dyn VectorSearch,
    state: &mut WorkflowState,
) -> Result<(), WorkflowError> {
    let search_query = state
        .search_query
        .clone()
        .unwrap_or_else(|| state.query.clone());
    log::info!("Retrieval: searching for '{}'", search_query);

    let documents = match fetch_documents(embeddings, search, &search_query).await {
        Ok(documents) => documents,
        Err(e) => {
            log::warn!(
                "Retrieval collaborators failed ({}), synthesizing over an empty document set",
                e
            );
            state.annotate("retrieval_error", json!(e.to_string()));
            Vec::new()
        }
    };
    state.annotate("documents_retrieved", json!(documents.len()));

    let retrieved_docs = format_documents(&documents);
    let sources = source_labels(&documents);

    let prompt = prompts::retrieval_synthesis(
        state.context_or_default(),
        &state.query,
        &retrieved_docs,
        &sources.join(", "),
    );

    let answer: RetrievalAnswer =
        gateway
            .invoke(&prompt)
            .await
            .map_err(|source| WorkflowError::Provider {
                node: NodeName::Retrieval.as_str(),
                source,
            })?;

    log::info!(
        "Retrieval: response synthesized (confidence: {:.2})",
        answer.confidence
    );

    state.annotate("has_complete_answer", json!(answer.has_complete_answer));
    state.branch_result = Some(BranchResult::Retrieval(answer));

    Ok(())
}

async fn fetch_documents(
    embeddings: &dyn EmbeddingClient,
    search: &dyn VectorSearch,
    query: &str,
) -> Result<Vec<ScoredDocument>, CollaboratorError> {
    let vector = embeddings.embed(query).await?;
    search.search(&vector).await
}

fn format_documents(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "**Document {}** (Score: {:.2}):\n{}\nSource: {}",
                i + 1,
                doc.score,
                doc.text,
                doc.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Deduplicated source labels in retrieval order
fn source_labels(documents: &[ScoredDocument]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for doc in documents {
        if !labels.contains(&doc.source) {
            labels.push(doc.source.clone());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn doc(source: &str, text: &str, score: f32) -> ScoredDocument {
        ScoredDocument {
            id: format!("id-{}", source),
            text: text.to_string(),
            score,
            source: source.to_string(),
            metadata: Value::Null,
        }
    }

    #[test]
    fn test_format_documents_numbers_and_scores() {
        let docs = vec![doc("a", "alpha", 0.92), doc("b", "beta", 0.81)];
        let formatted = format_documents(&docs);

        assert!(formatted.contains("**Document 1** (Score: 0.92)"));
        assert!(formatted.contains("**Document 2** (Score: 0.81)"));
        assert!(formatted.contains("Source: b"));
    }

    #[test]
    fn test_source_labels_deduplicated_in_order() {
        let docs = vec![
            doc("raydium-docs", "x", 0.9),
            doc("solana-cookbook", "y", 0.8),
            doc("raydium-docs", "z", 0.7),
        ];

        assert_eq!(source_labels(&docs), vec!["raydium-docs", "solana-cookbook"]);
    }

    #[test]
    fn test_empty_document_set_formats_to_empty() {
        assert!(format_documents(&[]).is_empty());
        assert!(source_labels(&[]).is_empty());
    }
}
