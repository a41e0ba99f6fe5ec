use aqua_types::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Configuration for building revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Protocol string written into every revision
    pub protocol_version: String,
    /// Upper bound on a witness confirmation at build time (ms)
    pub witness_timeout_ms: u64,
    /// `link_type` written into link revisions
    pub link_type: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            witness_timeout_ms: 10_000,
            link_type: "aqua".to_string(),
        }
    }
}
