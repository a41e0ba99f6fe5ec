use aqua_types::{ContentHash, TreeError};

/// Errors from a [`ContentFetcher`](crate::ContentFetcher).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("content {hash} unavailable: {reason}")]
    ContentUnavailable { hash: ContentHash, reason: String },

    #[error("fetching {hash} timed out after {after_ms}ms")]
    Timeout { hash: ContentHash, after_ms: u64 },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors that stop a verification run. Hash, signature and witness mismatches
/// are reported as failed revisions instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed tree: {0}")]
    Tree(#[from] TreeError),

    #[error("verification cancelled")]
    Cancelled,
}
