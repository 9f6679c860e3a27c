// SPDX-License-Identifier: MIT

//! The workflow core: intent classification, conditional routing, three
//! branch processors, and final synthesis, driven by [engine::WorkflowEngine].
//!
//! Graph: `entry -> intent_detection -> {chat | retrieval | crawl_web}
//! -> final_synthesis -> terminal`. Exactly one branch executes per run.

pub mod engine;
pub mod nodes;
pub mod prompts;
pub mod router;
pub mod schemas;
pub mod state;

pub use engine::WorkflowEngine;
pub use state::{BranchResult, Intent, NodeName, WorkflowState};
