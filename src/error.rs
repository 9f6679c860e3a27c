// SPDX-License-Identifier: MIT

//! Typed error handling for solai-rs
//!
//! Three failure classes with different blast radii:
//! - [ProviderError]: both configured model providers failed for one
//!   structured call. Fatal to the run.
//! - [CollaboratorError]: embedding, search, or crawl failed. Recovered
//!   inside the owning branch as a degraded result.
//! - [WorkflowError]: fatal engine errors, including provider failures
//!   tagged with the node they occurred at and invariant violations that
//!   should be unreachable in correct operation.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for solai-rs
#[derive(Debug, Error)]
pub enum SolaiError {
    /// Configuration errors (missing file, invalid provider, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fatal workflow errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Collaborator failures surfaced outside a branch (ingestion pipeline)
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

impl SolaiError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<String> for SolaiError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SolaiError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// Fatal workflow errors. The run aborts and no terminal state is produced.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Both configured providers failed at the named node
    #[error("provider failure at node '{node}': {source}")]
    Provider {
        node: &'static str,
        #[source]
        source: ProviderError,
    },

    /// A run was constructed with an empty query
    #[error("query must be non-empty")]
    EmptyQuery,

    /// The router was invoked before intent classification completed
    #[error("router invoked before an intent was classified")]
    IntentUnset,

    /// The terminal state is missing a required field
    #[error("terminal state missing required field '{0}'")]
    IncompleteTerminal(&'static str),
}

/// Both providers failed for a single structured-output call.
///
/// Carries the primary and fallback causes; there is no further retry.
#[derive(Debug, Error)]
#[error("primary provider failed: {primary}; fallback provider failed: {fallback}")]
pub struct ProviderError {
    pub primary: ProviderFailure,
    pub fallback: ProviderFailure,
}

/// A single provider attempt failure
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider API
    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Output violating the required schema (shape or value range)
    #[error("output violates the {schema} schema: {reason}")]
    Schema {
        schema: &'static str,
        reason: String,
    },

    /// Call exceeded its time budget
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderFailure {
    /// Create an API error
    pub fn api(provider: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            provider,
            status,
            body: body.into(),
        }
    }

    /// Create a schema violation error
    pub fn schema(schema: &'static str, reason: impl Into<String>) -> Self {
        Self::Schema {
            schema,
            reason: reason.into(),
        }
    }
}

/// Embedding, search, or crawl failure.
///
/// Always recovered inside the owning branch and converted into a
/// degraded-but-valid branch result; never fatal to a run.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-success status from the collaborator API
    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Response missing expected fields
    #[error("invalid response from {service}: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

impl CollaboratorError {
    /// Create an API error
    pub fn api(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            service,
            status,
            body: body.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid(service: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            reason: reason.into(),
        }
    }
}
