// SPDX-License-Identifier: MIT

//! HTTP boundary - thin axum adapter over the workflow engine
//!
//! `/api/chat` runs a query to completion, `/api/chat/stream` surfaces the
//! three workflow steps as server-sent events, `/api/admin/crawl` triggers
//! the ingestion pipeline.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::ContextBuilder;
use crate::error::SolaiError;
use crate::rag::ingest::Ingestor;
use crate::workflow::{NodeName, WorkflowEngine, WorkflowState};

/// Shared read-only application state
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub context_builder: Arc<ContextBuilder>,
    /// Present only when RAG indexing is enabled
    pub ingestor: Option<Arc<Ingestor>>,
}

pub async fn serve(state: AppState, port: u16) -> Result<(), SolaiError> {
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
        .route("/api/admin/crawl", post(trigger_crawl))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    query: String,
    #[serde(default)]
    user_wallet: Option<String>,
    #[serde(default = "default_true")]
    include_portfolio_context: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response_text: String,
    intent_used: String,
    sources: Vec<String>,
    confidence: f32,
    metadata: Value,
}

async fn build_initial_state(
    state: &AppState,
    payload: &ChatRequest,
) -> Result<WorkflowState, (StatusCode, String)> {
    let mut context_blocks = Vec::new();

    if payload.include_portfolio_context {
        if let Some(wallet) = &payload.user_wallet {
            let wallet_context = state.context_builder.build_wallet_context(wallet).await;
            context_blocks.extend(wallet_context.text_blocks);
        }
    }

    WorkflowState::new(payload.query.clone(), context_blocks.join("\n---\n"))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let initial = build_initial_state(&state, &payload).await?;

    let terminal = state.engine.execute(initial).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Workflow execution failed: {}", e),
        )
    })?;

    Ok(Json(ChatResponse {
        response_text: terminal.final_response.clone(),
        intent_used: terminal
            .intent
            .map(|i| i.to_string())
            .unwrap_or_default(),
        sources: terminal.sources.clone(),
        confidence: terminal.confidence,
        metadata: Value::Object(terminal.metadata().clone()),
    }))
}

async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Event>(16);

    tokio::spawn(async move {
        let initial = match build_initial_state(&state, &payload).await {
            Ok(initial) => initial,
            Err((_, message)) => {
                let _ = tx.send(error_event(&message)).await;
                return;
            }
        };

        let mut steps = std::pin::pin!(state.engine.execute_streaming(initial));
        while let Some(step) = steps.next().await {
            match step {
                Ok((node, snapshot)) => {
                    let _ = tx.send(step_event(node, &snapshot)).await;
                }
                Err(e) => {
                    let _ = tx.send(error_event(&e.to_string())).await;
                    return;
                }
            }
        }
    });

    Sse::new(ReceiverStream::new(rx).map(Ok))
}

/// Per-node step summary, mirroring what each node contributes
fn step_summary(node: NodeName, snapshot: &WorkflowState) -> Value {
    let metadata = snapshot.metadata();
    match node {
        NodeName::IntentDetection => json!({
            "node": node.as_str(),
            "intent": snapshot.intent.map(|i| i.to_string()),
            "confidence": snapshot.intent_confidence,
            "reasoning": snapshot.intent_reasoning.clone(),
        }),
        NodeName::Chat => json!({
            "node": node.as_str(),
            "response_preview": preview(
                snapshot
                    .branch_result
                    .as_ref()
                    .map(|b| b.response_text())
                    .unwrap_or_default()
            ),
        }),
        NodeName::Retrieval => json!({
            "node": node.as_str(),
            "documents_retrieved": metadata.get("documents_retrieved"),
            "has_complete_answer": metadata.get("has_complete_answer"),
        }),
        NodeName::CrawlWeb => json!({
            "node": node.as_str(),
            "url": snapshot.target_url.clone(),
            "success": metadata.get("crawl_success"),
        }),
        NodeName::FinalSynthesis => json!({
            "node": node.as_str(),
            "final": true,
            "response_text": snapshot.final_response.clone(),
            "sources": snapshot.sources.clone(),
            "confidence": snapshot.confidence,
        }),
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.len() <= LIMIT {
        return text.to_string();
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn step_event(node: NodeName, snapshot: &WorkflowState) -> Event {
    let summary = step_summary(node, snapshot);
    Event::default()
        .event(node.as_str())
        .json_data(&summary)
        .unwrap_or_else(|_| Event::default().event(node.as_str()).data("{}"))
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .json_data(&json!({ "error": message }))
        .unwrap_or_else(|_| Event::default().event("error").data("{}"))
}

#[derive(Debug, Deserialize)]
struct CrawlTriggerRequest {
    #[serde(default)]
    urls: Option<Vec<String>>,
}

async fn trigger_crawl(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CrawlTriggerRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(ingestor) = &state.ingestor else {
        return Err((
            StatusCode::BAD_REQUEST,
            "RAG indexing is not enabled".to_string(),
        ));
    };

    let report = ingestor.ingest(payload.urls).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Crawl failed: {}", e),
        )
    })?;

    Ok(Json(json!({
        "status": "success",
        "documents_crawled": report.documents_crawled,
        "chunks_prepared": report.chunks_prepared,
        "chunks_indexed": report.chunks_indexed,
    })))
}
