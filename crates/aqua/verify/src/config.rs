use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the chain verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Upper bound on a single content fetch (ms)
    pub fetch_timeout_ms: u64,
    /// Upper bound on a single witness confirmation (ms)
    pub witness_timeout_ms: u64,
    /// Revisions verified concurrently
    pub max_concurrency: usize,
    /// Confirm witness transactions against their network
    pub confirm_witnesses: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 30_000,
            witness_timeout_ms: 10_000,
            max_concurrency: 8,
            confirm_witnesses: true,
        }
    }
}

impl VerifierConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn witness_timeout(&self) -> Duration {
        Duration::from_millis(self.witness_timeout_ms)
    }
}
