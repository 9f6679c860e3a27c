// SPDX-License-Identifier: MIT

//! Wallet context assembly
//!
//! Builds the caller-supplied background text the workflow carries in
//! `WorkflowState::context`. Indexer failures degrade to an explanatory
//! text block; they never abort the query.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::error::CollaboratorError;

/// A single token position in a wallet
#[derive(Debug, Clone)]
pub struct PortfolioHolding {
    pub token: String,
    pub name: String,
    pub amount: f64,
    pub usd_value: f64,
}

/// A recent on-chain transaction
#[derive(Debug, Clone)]
pub struct WalletTransaction {
    pub signature: String,
    pub timestamp: i64,
    pub kind: String,
    pub amount_sol: f64,
}

/// Transaction-history indexer consumed through a narrow interface
#[async_trait]
pub trait Indexer: Send + Sync {
    async fn wallet_portfolio(
        &self,
        wallet: &str,
    ) -> Result<Vec<PortfolioHolding>, CollaboratorError>;

    async fn wallet_transactions(
        &self,
        wallet: &str,
        limit: usize,
    ) -> Result<Vec<WalletTransaction>, CollaboratorError>;
}

/// Rendered wallet context plus diagnostics
#[derive(Debug, Clone)]
pub struct WalletContext {
    pub text_blocks: Vec<String>,
    pub metadata: Value,
}

/// Assembles wallet context text blocks from indexer data
pub struct ContextBuilder {
    indexer: Arc<dyn Indexer>,
}

impl ContextBuilder {
    pub fn new(indexer: Arc<dyn Indexer>) -> Self {
        Self { indexer }
    }

    pub async fn build_wallet_context(&self, wallet: &str) -> WalletContext {
        let mut text_blocks = Vec::new();
        let mut holdings_count = 0;
        let mut transactions_count = 0;

        match self.indexer.wallet_portfolio(wallet).await {
            Ok(holdings) if !holdings.is_empty() => {
                holdings_count = holdings.len();
                let lines: Vec<String> = holdings
                    .iter()
                    .map(|h| {
                        format!(
                            "{} ({}): {:.4} worth ${:.2}",
                            h.token, h.name, h.amount, h.usd_value
                        )
                    })
                    .collect();
                text_blocks.push(format!("Wallet portfolio:\n{}", lines.join("\n")));
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Portfolio lookup failed for {}: {}", wallet, e);
                text_blocks.push(format!("Wallet context unavailable: {}", e));
            }
        }

        match self.indexer.wallet_transactions(wallet, 10).await {
            Ok(transactions) if !transactions.is_empty() => {
                transactions_count = transactions.len();
                let lines: Vec<String> = transactions
                    .iter()
                    .map(|tx| {
                        let when = Utc
                            .timestamp_opt(tx.timestamp, 0)
                            .single()
                            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                            .unwrap_or_else(|| "unknown time".to_string());
                        format!("{} of {:.4} SOL at {}", tx.kind, tx.amount_sol, when)
                    })
                    .collect();
                text_blocks.push(format!("Recent transactions:\n{}", lines.join("\n")));
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Transaction lookup failed for {}: {}", wallet, e);
            }
        }

        WalletContext {
            text_blocks,
            metadata: json!({
                "wallet": wallet,
                "holdings": holdings_count,
                "transactions": transactions_count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIndexer;

    #[async_trait]
    impl Indexer for FixedIndexer {
        async fn wallet_portfolio(
            &self,
            _wallet: &str,
        ) -> Result<Vec<PortfolioHolding>, CollaboratorError> {
            Ok(vec![PortfolioHolding {
                token: "SOL".to_string(),
                name: "Solana".to_string(),
                amount: 12.5,
                usd_value: 1940.38,
            }])
        }

        async fn wallet_transactions(
            &self,
            _wallet: &str,
            _limit: usize,
        ) -> Result<Vec<WalletTransaction>, CollaboratorError> {
            Ok(vec![WalletTransaction {
                signature: "sig1".to_string(),
                timestamp: 1_754_000_000,
                kind: "swap".to_string(),
                amount_sol: 2.0,
            }])
        }
    }

    struct BrokenIndexer;

    #[async_trait]
    impl Indexer for BrokenIndexer {
        async fn wallet_portfolio(
            &self,
            _wallet: &str,
        ) -> Result<Vec<PortfolioHolding>, CollaboratorError> {
            Err(CollaboratorError::invalid("indexer", "unreachable"))
        }

        async fn wallet_transactions(
            &self,
            _wallet: &str,
            _limit: usize,
        ) -> Result<Vec<WalletTransaction>, CollaboratorError> {
            Err(CollaboratorError::invalid("indexer", "unreachable"))
        }
    }

    #[tokio::test]
    async fn test_context_renders_portfolio_and_transactions() {
        let builder = ContextBuilder::new(Arc::new(FixedIndexer));
        let context = builder.build_wallet_context("wallet123").await;

        assert_eq!(context.text_blocks.len(), 2);
        assert!(context.text_blocks[0].contains("SOL (Solana)"));
        assert!(context.text_blocks[1].contains("swap of 2.0000 SOL"));
        assert_eq!(context.metadata["holdings"], 1);
    }

    #[tokio::test]
    async fn test_indexer_failure_degrades_to_text_block() {
        let builder = ContextBuilder::new(Arc::new(BrokenIndexer));
        let context = builder.build_wallet_context("wallet123").await;

        assert_eq!(context.text_blocks.len(), 1);
        assert!(context.text_blocks[0].starts_with("Wallet context unavailable:"));
    }
}
