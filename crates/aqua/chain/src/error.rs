use aqua_types::{ContentHash, TreeError};

/// Errors from building, signing, witnessing and linking trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("content is empty")]
    EmptyContent,

    #[error("tree has no resolvable head: {0}")]
    NoHead(TreeError),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("witness unavailable: {0}")]
    WitnessUnavailable(WitnessError),

    #[error("cyclic link: {0}")]
    CyclicLink(String),

    #[error("cannot remove the genesis revision")]
    LastRevision,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors from resolving a link revision to the file it names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("revision {0} is not a link")]
    NotALink(ContentHash),

    #[error("invalid link {revision}: {reason}")]
    InvalidLink {
        revision: ContentHash,
        reason: String,
    },

    #[error("link {revision} targets {target}, which no supplied tree contains")]
    UnresolvedDeepLink {
        revision: ContentHash,
        target: ContentHash,
    },

    #[error("revision {0} not found")]
    RevisionNotFound(ContentHash),
}

/// Errors from an external witness network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WitnessError {
    #[error("witness network {network} unreachable: {reason}")]
    Unreachable { network: String, reason: String },

    #[error("witness network {network} timed out after {after_ms}ms")]
    Timeout { network: String, after_ms: u64 },

    #[error("transaction {transaction} not found on {network}")]
    TransactionNotFound {
        network: String,
        transaction: String,
    },

    #[error("transaction anchors {found}, expected {expected}")]
    AnchorMismatch {
        expected: ContentHash,
        found: ContentHash,
    },
}

impl WitnessError {
    /// Whether the failure says nothing about the witness itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WitnessError::Unreachable { .. } | WitnessError::Timeout { .. }
        )
    }
}
