// SPDX-License-Identifier: MIT

//! solai-rs: intent-routed question answering for the Solana ecosystem
//!
//! The core is the workflow engine in [workflow]: one structured call
//! classifies the query's intent, a router picks one of three branch
//! processors (direct chat, retrieval-augmented answer, live web-page
//! summarization), and a final synthesis call produces the single
//! user-visible answer with cited sources. Every structured-output call
//! goes through the provider gateway in [provider], which falls back from
//! the primary model provider to the secondary exactly once.
//!
//! Everything else is a thin adapter: [rag] (embeddings + vector search),
//! [crawl] (page scraping), [context] (wallet context), [server] (HTTP
//! boundary), and [services] (deterministic offline collaborators).

pub mod config;
pub mod context;
pub mod crawl;
pub mod error;
pub mod provider;
pub mod rag;
pub mod server;
pub mod services;
pub mod workflow;
