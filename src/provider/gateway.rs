// SPDX-License-Identifier: MIT

//! Provider gateway - primary provider with a single fallback attempt
//!
//! Every structured-output call in the workflow goes through here. On any
//! primary failure (transport, timeout, schema violation) the call is
//! retried exactly once against the secondary provider; a second failure is
//! a fatal [ProviderError]. There are no retries beyond that one switch.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use super::{StructuredOutput, StructuredProvider};
use crate::error::{ProviderError, ProviderFailure};

/// Uniform structured-output call with primary to secondary fallback.
///
/// Holds only immutable configuration; a single gateway is shared read-only
/// across all concurrent runs.
pub struct ProviderGateway {
    primary: Arc<dyn StructuredProvider>,
    fallback: Arc<dyn StructuredProvider>,
    call_timeout: Duration,
}

impl ProviderGateway {
    pub fn new(primary: Arc<dyn StructuredProvider>, fallback: Arc<dyn StructuredProvider>) -> Self {
        Self {
            primary,
            fallback,
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-call time budget
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Invoke the primary provider; on failure, the fallback once.
    ///
    /// The raw JSON is decoded into `T` and checked against its value-range
    /// contract; a violation counts as a provider failure like any other.
    pub async fn invoke<T: StructuredOutput>(&self, prompt: &str) -> Result<T, ProviderError> {
        let primary_err = match self.attempt::<T>(self.primary.as_ref(), prompt).await {
            Ok(output) => return Ok(output),
            Err(e) => e,
        };

        log::warn!(
            "Primary provider {} failed ({}), falling back to {}",
            self.primary.name(),
            primary_err,
            self.fallback.name()
        );

        match self.attempt::<T>(self.fallback.as_ref(), prompt).await {
            Ok(output) => Ok(output),
            Err(fallback_err) => Err(ProviderError {
                primary: primary_err,
                fallback: fallback_err,
            }),
        }
    }

    async fn attempt<T: StructuredOutput>(
        &self,
        provider: &dyn StructuredProvider,
        prompt: &str,
    ) -> Result<T, ProviderFailure> {
        let call = provider.invoke_raw(T::NAME, T::json_schema(), prompt);
        let value = match timeout(self.call_timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(ProviderFailure::Timeout(self.call_timeout)),
        };
        decode(value)
    }
}

/// Decode a raw provider value into `T`, enforcing the schema contract
fn decode<T: StructuredOutput>(value: Value) -> Result<T, ProviderFailure> {
    let output: T =
        serde_json::from_value(value).map_err(|e| ProviderFailure::schema(T::NAME, e.to_string()))?;
    output
        .validate()
        .map_err(|reason| ProviderFailure::schema(T::NAME, reason))?;
    Ok(output)
}
