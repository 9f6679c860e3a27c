// SPDX-License-Identifier: MIT

//! Mock collaborators
//!
//! Deterministic stand-ins for the external services, used by the `--mock`
//! flag and local demos: keyword-presence embeddings, a keyword-scored
//! document corpus, a canned crawler, and a fixed wallet indexer. No
//! randomness anywhere, so demo runs are reproducible.

use async_trait::async_trait;
use serde_json::json;

use crate::context::{Indexer, PortfolioHolding, WalletTransaction};
use crate::crawl::{CrawledDocument, Crawler};
use crate::error::CollaboratorError;
use crate::rag::{EmbeddingClient, ScoredDocument, VectorSearch};

/// Vocabulary shared by the mock embedder and the mock search. Each vector
/// dimension marks the presence of one keyword in the embedded text.
const KEYWORDS: &[&str] = &[
    "defi",
    "risk",
    "swap",
    "stake",
    "staking",
    "jupiter",
    "solana",
    "liquidity",
    "trade",
];

/// Keyword-presence embeddings: dimension i is 1.0 when keyword i occurs in
/// the text. Crude, but deterministic and enough for the mock search to
/// rank the corpus plausibly.
pub struct MockEmbeddings;

#[async_trait]
impl EmbeddingClient for MockEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let lower = text.to_lowercase();
        Ok(KEYWORDS
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect())
    }
}

struct CorpusEntry {
    text: &'static str,
    source: &'static str,
    title: &'static str,
    relevance: f32,
}

const CORPUS: &[CorpusEntry] = &[
    CorpusEntry {
        text: "Solana is a high-performance blockchain supporting up to 65,000 \
               transactions per second with sub-second finality. It uses Proof of \
               History combined with Proof of Stake for consensus.",
        source: "https://solana.com/docs",
        title: "Solana Overview",
        relevance: 0.92,
    },
    CorpusEntry {
        text: "Jupiter is the key liquidity aggregator for Solana, offering the best \
               token swap rates by routing through multiple DEXs. It supports limit \
               orders, DCA, and perpetual trading.",
        source: "https://docs.jup.ag",
        title: "Jupiter Aggregator",
        relevance: 0.88,
    },
    CorpusEntry {
        text: "DeFi risk management involves monitoring smart contract audits, \
               protocol TVL changes, impermanent loss in liquidity pools, and \
               diversification across multiple protocols.",
        source: "https://station.jup.ag/docs",
        title: "DeFi Risk Management",
        relevance: 0.85,
    },
    CorpusEntry {
        text: "Liquid staking on Solana allows users to stake SOL while maintaining \
               liquidity through derivative tokens like mSOL or JitoSOL, enabling \
               participation in DeFi while earning staking rewards.",
        source: "https://docs.marinade.finance",
        title: "Liquid Staking",
        relevance: 0.82,
    },
    CorpusEntry {
        text: "Token swaps on Solana are optimized through aggregators that split \
               orders across multiple liquidity sources. Best practices include \
               checking slippage tolerance and using versioned transactions.",
        source: "https://docs.jup.ag/swap-api",
        title: "Swap Optimization",
        relevance: 0.78,
    },
];

/// Keyword-scored search over the static corpus. Reads the query's keyword
/// dimensions out of the vector produced by [MockEmbeddings].
pub struct MockVectorSearch {
    top_k: usize,
}

impl MockVectorSearch {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }
}

#[async_trait]
impl VectorSearch for MockVectorSearch {
    async fn search(&self, vector: &[f32]) -> Result<Vec<ScoredDocument>, CollaboratorError> {
        let mut scored: Vec<ScoredDocument> = CORPUS
            .iter()
            .map(|entry| {
                let entry_lower = entry.text.to_lowercase();
                let mut score = entry.relevance;
                for (i, keyword) in KEYWORDS.iter().enumerate() {
                    let present = vector.get(i).copied().unwrap_or(0.0) > 0.5;
                    if present && entry_lower.contains(keyword) {
                        score += 0.05;
                    }
                }
                ScoredDocument {
                    id: entry.title.to_string(),
                    text: entry.text.to_string(),
                    score: score.min(0.99),
                    source: entry.source.to_string(),
                    metadata: json!({ "title": entry.title }),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);
        Ok(scored)
    }
}

/// Canned single-page crawler
pub struct MockCrawler;

#[async_trait]
impl Crawler for MockCrawler {
    async fn crawl(&self, url: &str) -> Result<Vec<CrawledDocument>, CollaboratorError> {
        Ok(vec![CrawledDocument {
            markdown: format!(
                "# Example Page\n\nThis is deterministic mock content for {}.\n\n\
                 It stands in for a crawled documentation page during demos.",
                url
            ),
            html: String::new(),
            metadata: json!({ "title": "Example Page" }),
            url: url.to_string(),
        }])
    }
}

/// Fixed wallet data, no randomness
pub struct MockIndexer;

#[async_trait]
impl Indexer for MockIndexer {
    async fn wallet_portfolio(
        &self,
        _wallet: &str,
    ) -> Result<Vec<PortfolioHolding>, CollaboratorError> {
        Ok(vec![
            PortfolioHolding {
                token: "SOL".to_string(),
                name: "Solana".to_string(),
                amount: 42.5,
                usd_value: 6597.28,
            },
            PortfolioHolding {
                token: "USDC".to_string(),
                name: "USD Coin".to_string(),
                amount: 1250.0,
                usd_value: 1250.0,
            },
            PortfolioHolding {
                token: "JUP".to_string(),
                name: "Jupiter".to_string(),
                amount: 800.0,
                usd_value: 736.0,
            },
        ])
    }

    async fn wallet_transactions(
        &self,
        _wallet: &str,
        limit: usize,
    ) -> Result<Vec<WalletTransaction>, CollaboratorError> {
        let transactions = vec![
            WalletTransaction {
                signature: "mock_tx_1".to_string(),
                timestamp: 1_754_400_000,
                kind: "swap".to_string(),
                amount_sol: 2.5,
            },
            WalletTransaction {
                signature: "mock_tx_2".to_string(),
                timestamp: 1_754_300_000,
                kind: "stake".to_string(),
                amount_sol: 10.0,
            },
            WalletTransaction {
                signature: "mock_tx_3".to_string(),
                timestamp: 1_754_200_000,
                kind: "add_liquidity".to_string(),
                amount_sol: 5.0,
            },
        ];
        Ok(transactions.into_iter().take(limit).collect())
    }
}
