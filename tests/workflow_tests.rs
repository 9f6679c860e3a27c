//! Integration tests for workflow execution
//!
//! These tests drive the engine end to end with scripted providers and
//! counting collaborator stubs, covering routing, degraded branches,
//! provider fallback, and both execution modes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use solai_rs::crawl::{CrawledDocument, Crawler};
use solai_rs::error::{CollaboratorError, ProviderFailure, WorkflowError};
use solai_rs::provider::{ProviderGateway, StructuredProvider};
use solai_rs::rag::{EmbeddingClient, ScoredDocument, VectorSearch};
use solai_rs::workflow::{BranchResult, Intent, NodeName, WorkflowEngine, WorkflowState};

// ============================================================================
// Mock Components
// ============================================================================

/// Scripted provider: returns queued JSON values in call order
struct StubProvider {
    name: &'static str,
    responses: Vec<Value>,
    index: AtomicUsize,
    calls: AtomicUsize,
    fail: bool,
}

impl StubProvider {
    fn scripted(name: &'static str, responses: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            name,
            responses,
            index: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            responses: Vec::new(),
            index: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn invoke_raw(
        &self,
        _schema_name: &'static str,
        _schema: &Value,
        _prompt: &str,
    ) -> Result<Value, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderFailure::api(self.name, 500, "stub failure"));
        }
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(idx)
            .cloned()
            .ok_or_else(|| ProviderFailure::api(self.name, 500, "stub response queue exhausted"))
    }
}

#[derive(Default)]
struct StubEmbeddings {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingClient for StubEmbeddings {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.1, 0.2, 0.3])
    }
}

struct StubSearch {
    documents: Vec<ScoredDocument>,
    calls: AtomicUsize,
}

impl StubSearch {
    fn new(documents: Vec<ScoredDocument>) -> Self {
        Self {
            documents,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorSearch for StubSearch {
    async fn search(&self, _vector: &[f32]) -> Result<Vec<ScoredDocument>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.clone())
    }
}

struct StubCrawler {
    documents: Vec<CrawledDocument>,
    calls: AtomicUsize,
}

impl StubCrawler {
    fn new(documents: Vec<CrawledDocument>) -> Self {
        Self {
            documents,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Crawler for StubCrawler {
    async fn crawl(&self, _url: &str) -> Result<Vec<CrawledDocument>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.clone())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn document(source: &str, text: &str, score: f32) -> ScoredDocument {
    ScoredDocument {
        id: format!("doc-{}", source),
        text: text.to_string(),
        score,
        source: source.to_string(),
        metadata: Value::Null,
    }
}

struct Harness {
    engine: WorkflowEngine,
    embeddings: Arc<StubEmbeddings>,
    search: Arc<StubSearch>,
    crawler: Arc<StubCrawler>,
}

fn harness(
    provider: Arc<StubProvider>,
    search_docs: Vec<ScoredDocument>,
    crawl_docs: Vec<CrawledDocument>,
) -> Harness {
    harness_with_fallback(provider, StubProvider::failing("unused-fallback"), search_docs, crawl_docs)
}

fn harness_with_fallback(
    primary: Arc<StubProvider>,
    fallback: Arc<StubProvider>,
    search_docs: Vec<ScoredDocument>,
    crawl_docs: Vec<CrawledDocument>,
) -> Harness {
    let embeddings = Arc::new(StubEmbeddings::default());
    let search = Arc::new(StubSearch::new(search_docs));
    let crawler = Arc::new(StubCrawler::new(crawl_docs));

    let gateway = ProviderGateway::new(primary, fallback);
    let engine = WorkflowEngine::new(
        gateway,
        embeddings.clone(),
        search.clone(),
        crawler.clone(),
    );

    Harness {
        engine,
        embeddings,
        search,
        crawler,
    }
}

fn retrieval_script() -> Vec<Value> {
    vec![
        json!({
            "intent": "retrieval",
            "confidence": 0.9,
            "search_query": "liquidity Raydium",
            "reasoning": "asks about protocol usage"
        }),
        json!({
            "response_text": "Provide liquidity on Raydium by depositing both tokens of a pair.",
            "sources_used": ["raydium-docs", "solana-cookbook"],
            "confidence": 0.8,
            "has_complete_answer": true
        }),
        json!({
            "response_text": "To provide liquidity on Raydium, deposit both tokens of a pair into a pool.",
            "intent_used": "retrieval",
            "sources": ["raydium-docs", "solana-cookbook"],
            "confidence": 0.85
        }),
    ]
}

fn raydium_documents() -> Vec<ScoredDocument> {
    vec![
        document("raydium-docs", "Raydium pools pair two tokens.", 0.91),
        document("solana-cookbook", "Liquidity provision basics.", 0.84),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_retrieval_run_cites_search_sources() {
    let provider = StubProvider::scripted("primary", retrieval_script());
    let h = harness(provider.clone(), raydium_documents(), vec![]);

    let initial = WorkflowState::new("How do I provide liquidity on Raydium?", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    assert_eq!(terminal.intent, Some(Intent::Retrieval));
    assert_eq!(terminal.search_query.as_deref(), Some("liquidity Raydium"));
    assert!(terminal.sources.contains(&"raydium-docs".to_string()));
    assert!(terminal.sources.contains(&"solana-cookbook".to_string()));
    assert_eq!(terminal.metadata()["intent_used"], json!("retrieval"));
    assert_eq!(terminal.metadata()["documents_retrieved"], json!(2));

    // One embed, one search, no crawl, three model calls
    assert_eq!(h.embeddings.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.crawler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_chat_run_never_invokes_collaborators() {
    let provider = StubProvider::scripted(
        "primary",
        vec![
            json!({
                "intent": "chat",
                "confidence": 0.95,
                "reasoning": "general knowledge question"
            }),
            json!({
                "response_text": "Solana is a high-performance blockchain.",
                "tone": "helpful",
                "follow_up_suggestions": ["What is Proof of History?"]
            }),
            json!({
                "response_text": "Solana is a high-performance blockchain network.",
                "intent_used": "chat",
                "sources": ["AI Assistant Knowledge"],
                "confidence": 0.9
            }),
        ],
    );
    let h = harness(provider.clone(), raydium_documents(), vec![]);

    let initial = WorkflowState::new("What is Solana?", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    assert_eq!(terminal.intent, Some(Intent::Chat));
    assert!(matches!(terminal.branch_result, Some(BranchResult::Chat(_))));
    assert_eq!(terminal.sources, vec!["AI Assistant Knowledge"]);

    assert_eq!(h.embeddings.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.crawler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_crawl_with_empty_fetch_degrades_but_completes() {
    let provider = StubProvider::scripted(
        "primary",
        vec![
            json!({
                "intent": "crawl_web",
                "confidence": 0.9,
                "url": "https://example.com",
                "reasoning": "asks to summarize a page"
            }),
            json!({
                "response_text": "The page could not be retrieved.",
                "source_url": "https://example.com",
                // The model claims success; the observed fetch outcome wins
                "crawl_success": true,
                "key_points": []
            }),
            json!({
                "response_text": "I could not retrieve the page at https://example.com.",
                "intent_used": "crawl_web",
                "sources": ["https://example.com"],
                "confidence": 0.3
            }),
        ],
    );
    let h = harness(provider.clone(), vec![], vec![]);

    let initial = WorkflowState::new("Summarize https://example.com", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    assert_eq!(h.crawler.calls.load(Ordering::SeqCst), 1);
    match &terminal.branch_result {
        Some(BranchResult::CrawlWeb(answer)) => assert!(!answer.crawl_success),
        other => panic!("Expected crawl branch result, got {:?}", other),
    }
    assert!(!terminal.final_response.is_empty());
    assert_eq!(terminal.metadata()["crawl_success"], json!(false));
}

#[tokio::test]
async fn test_missing_url_skips_crawler_and_its_model_call() {
    let provider = StubProvider::scripted(
        "primary",
        vec![
            json!({
                "intent": "crawl_web",
                "confidence": 0.7,
                "reasoning": "asks about a page but no URL given"
            }),
            json!({
                "response_text": "No URL was provided, so nothing could be summarized.",
                "intent_used": "crawl_web",
                "sources": ["No URL provided"],
                "confidence": 0.2
            }),
        ],
    );
    let h = harness(provider.clone(), vec![], vec![]);

    let initial = WorkflowState::new("Summarize that page we discussed", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    // The crawler is never called and the branch makes no model call
    assert_eq!(h.crawler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.calls(), 2);

    match &terminal.branch_result {
        Some(BranchResult::CrawlWeb(answer)) => {
            assert!(!answer.crawl_success);
            assert_eq!(answer.response_text, "No URL was provided to crawl.");
        }
        other => panic!("Expected crawl branch result, got {:?}", other),
    }
    assert_eq!(terminal.sources, vec!["No URL provided"]);
}

#[tokio::test]
async fn test_fallback_provider_completes_the_run() {
    let primary = StubProvider::failing("primary");
    let fallback = StubProvider::scripted("fallback", retrieval_script());
    let h = harness_with_fallback(primary.clone(), fallback.clone(), raydium_documents(), vec![]);

    let initial = WorkflowState::new("How do I provide liquidity on Raydium?", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    assert!(!terminal.final_response.is_empty());
    // Primary was attempted once per node, fallback served each call
    assert_eq!(primary.calls(), 3);
    assert_eq!(fallback.calls(), 3);
}

#[tokio::test]
async fn test_both_providers_failing_aborts_at_classifier() {
    let primary = StubProvider::failing("primary");
    let fallback = StubProvider::failing("fallback");
    let h = harness_with_fallback(primary.clone(), fallback.clone(), vec![], vec![]);

    let initial = WorkflowState::new("What is Solana?", "").unwrap();
    let err = h.engine.execute(initial).await.unwrap_err();

    match err {
        WorkflowError::Provider { node, .. } => assert_eq!(node, "intent_detection"),
        other => panic!("Expected provider failure, got {:?}", other),
    }

    // The run stopped at the first node: no branch, no synthesis
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
    assert_eq!(h.crawler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_range_confidence_is_rejected_not_clamped() {
    let script = vec![json!({
        "intent": "chat",
        "confidence": 1.5,
        "reasoning": "overconfident stub"
    })];
    let primary = StubProvider::scripted("primary", script.clone());
    let fallback = StubProvider::scripted("fallback", script);
    let h = harness_with_fallback(primary, fallback, vec![], vec![]);

    let initial = WorkflowState::new("What is Solana?", "").unwrap();
    let err = h.engine.execute(initial).await.unwrap_err();

    match err {
        WorkflowError::Provider { node, source } => {
            assert_eq!(node, "intent_detection");
            assert!(matches!(source.primary, ProviderFailure::Schema { .. }));
        }
        other => panic!("Expected provider failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_is_deterministic_with_stub_collaborators() {
    let run = || async {
        let provider = StubProvider::scripted("primary", retrieval_script());
        let h = harness(provider, raydium_documents(), vec![]);
        let initial = WorkflowState::new("How do I provide liquidity on Raydium?", "ctx").unwrap();
        h.engine.execute(initial).await.unwrap()
    };

    let first = run().await;
    let second = run().await;

    assert_eq!(first.final_response, second.final_response);
    assert_eq!(first.sources, second.sources);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.intent, second.intent);
}

#[tokio::test]
async fn test_streaming_yields_three_steps_then_ends() {
    let provider = StubProvider::scripted("primary", retrieval_script());
    let h = harness(provider, raydium_documents(), vec![]);

    let initial = WorkflowState::new("How do I provide liquidity on Raydium?", "").unwrap();
    let mut steps = std::pin::pin!(h.engine.execute_streaming(initial));

    let mut nodes = Vec::new();
    let mut last_snapshot = None;
    while let Some(step) = steps.next().await {
        let (node, snapshot) = step.unwrap();
        nodes.push(node);
        last_snapshot = Some(snapshot);
    }

    assert_eq!(
        nodes,
        vec![
            NodeName::IntentDetection,
            NodeName::Retrieval,
            NodeName::FinalSynthesis
        ]
    );

    let terminal = last_snapshot.unwrap();
    assert!(!terminal.final_response.is_empty());
    assert!(terminal.ensure_terminal().is_ok());
}

#[tokio::test]
async fn test_streaming_stops_after_fatal_node_error() {
    let primary = StubProvider::failing("primary");
    let fallback = StubProvider::failing("fallback");
    let h = harness_with_fallback(primary, fallback, vec![], vec![]);

    let initial = WorkflowState::new("What is Solana?", "").unwrap();
    let mut steps = std::pin::pin!(h.engine.execute_streaming(initial));

    let first = steps.next().await.unwrap();
    assert!(first.is_err());
    assert!(steps.next().await.is_none());
}

#[tokio::test]
async fn test_metadata_accumulates_across_nodes() {
    let provider = StubProvider::scripted("primary", retrieval_script());
    let h = harness(provider, raydium_documents(), vec![]);

    let initial = WorkflowState::new("How do I provide liquidity on Raydium?", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    // Annotations from the classifier, the branch, and the synthesizer all
    // survive to the terminal state
    let metadata = terminal.metadata();
    assert!(metadata.contains_key("intent_confidence"));
    assert!(metadata.contains_key("documents_retrieved"));
    assert!(metadata.contains_key("has_complete_answer"));
    assert!(metadata.contains_key("intent_used"));
}

#[tokio::test]
async fn test_empty_search_results_still_reach_terminal() {
    let provider = StubProvider::scripted(
        "primary",
        vec![
            json!({
                "intent": "retrieval",
                "confidence": 0.8,
                "search_query": "obscure topic",
                "reasoning": "needs documentation"
            }),
            json!({
                "response_text": "The knowledge base has no information on this topic.",
                "sources_used": [],
                "confidence": 0.1,
                "has_complete_answer": false
            }),
            json!({
                "response_text": "I could not find documentation on this topic.",
                "intent_used": "retrieval",
                "sources": [],
                "confidence": 0.1
            }),
        ],
    );
    let h = harness(provider.clone(), vec![], vec![]);

    let initial = WorkflowState::new("Tell me about an obscure protocol", "").unwrap();
    let terminal = h.engine.execute(initial).await.unwrap();

    // Synthesis still ran over the empty document set
    assert_eq!(provider.calls(), 3);
    assert_eq!(terminal.metadata()["documents_retrieved"], json!(0));
    assert_eq!(terminal.metadata()["has_complete_answer"], json!(false));
    assert!(!terminal.final_response.is_empty());
}
