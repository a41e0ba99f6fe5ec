use crate::hash::ContentHash;

/// Structural errors: the tree itself is malformed or the requested change would
/// break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("tree has no revisions")]
    EmptyTree,

    #[error("broken chain: revision {revision} references missing predecessor {missing}")]
    BrokenChain {
        revision: ContentHash,
        missing: ContentHash,
    },

    #[error("multiple heads: {0:?}")]
    MultipleHeads(Vec<ContentHash>),

    #[error("no head: every revision is referenced as a predecessor")]
    NoHead,

    #[error("revision chain revisits {0}")]
    CyclicChain(ContentHash),

    #[error("revisions unreachable from the head: {0:?}")]
    UnreachableRevisions(Vec<ContentHash>),

    #[error("append must extend the head: expected predecessor {expected:?}, found {found:?}")]
    NotHead {
        expected: Option<ContentHash>,
        found: Option<ContentHash>,
    },

    #[error("revision already present: {0}")]
    DuplicateRevision(ContentHash),

    #[error("revision {0} not found")]
    RevisionNotFound(ContentHash),

    #[error("link revision {0} has no link_verification_hashes")]
    EmptyLink(ContentHash),

    #[error("file_index is empty")]
    EmptyFileIndex,

    #[error("genesis revision {0} has no file_index entry")]
    UnnamedGenesis(ContentHash),

    #[error("malformed revision field `{field}`: {reason}")]
    MalformedRevision { field: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

impl From<serde_json::Error> for TreeError {
    fn from(error: serde_json::Error) -> Self {
        TreeError::Serialization(error.to_string())
    }
}

/// Errors from Merkle leaf construction and proofs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleError {
    #[error("content is empty")]
    EmptyContent,

    #[error("leaf index {index} out of range ({len} leaves)")]
    LeafOutOfRange { index: usize, len: usize },
}
