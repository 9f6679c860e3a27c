// SPDX-License-Identifier: MIT

//! Node implementations for the workflow graph
//!
//! Each node reads and updates the per-run [super::state::WorkflowState].
//! Branch nodes absorb collaborator failures into degraded results; the
//! only fatal condition inside any node is a provider failure from its own
//! structured call.

pub mod chat;
pub mod crawl;
pub mod intent;
pub mod retrieval;
pub mod synthesis;
