use serde::{Deserialize, Serialize};
use std::fmt;

use aqua_types::{ContentHash, RevisionType};

/// Outcome of one revision, or of one check on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    Passed,
    Failed,
    /// Could not be decided: content or witness network unavailable, unknown
    /// signature type, unresolved deep link.
    Indeterminate,
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RevisionStatus::Passed => "passed",
            RevisionStatus::Failed => "failed",
            RevisionStatus::Indeterminate => "indeterminate",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    HashMatch,
    PredecessorLinkage,
    Content,
    Leaves,
    LinkResolution,
    Signature,
    WitnessAnchor,
    WitnessConfirmation,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckKind::HashMatch => "hash_match",
            CheckKind::PredecessorLinkage => "predecessor_linkage",
            CheckKind::Content => "content",
            CheckKind::Leaves => "leaves",
            CheckKind::LinkResolution => "link_resolution",
            CheckKind::Signature => "signature",
            CheckKind::WitnessAnchor => "witness_anchor",
            CheckKind::WitnessConfirmation => "witness_confirmation",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub check: CheckKind,
    pub outcome: RevisionStatus,
    pub message: String,
}

impl LogEntry {
    pub fn passed(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            outcome: RevisionStatus::Passed,
            message: message.into(),
        }
    }

    pub fn failed(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            outcome: RevisionStatus::Failed,
            message: message.into(),
        }
    }

    pub fn indeterminate(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            outcome: RevisionStatus::Indeterminate,
            message: message.into(),
        }
    }
}

/// Per-revision report. Logs are in the order the checks ran.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub hash: ContentHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_type: Option<RevisionType>,
    pub status: RevisionStatus,
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

impl VerificationResult {
    /// Any failed check fails the revision; otherwise any undecided check leaves
    /// it indeterminate.
    pub fn from_logs(
        hash: ContentHash,
        revision_type: Option<RevisionType>,
        logs: Vec<LogEntry>,
    ) -> Self {
        let status = aggregate(logs.iter().map(|entry| entry.outcome));
        Self {
            hash,
            revision_type,
            status,
            success: status == RevisionStatus::Passed,
            logs,
        }
    }

    pub fn log_for(&self, check: CheckKind) -> Option<&LogEntry> {
        self.logs.iter().find(|entry| entry.check == check)
    }
}

fn aggregate(outcomes: impl Iterator<Item = RevisionStatus>) -> RevisionStatus {
    let mut status = RevisionStatus::Passed;
    for outcome in outcomes {
        match outcome {
            RevisionStatus::Failed => return RevisionStatus::Failed,
            RevisionStatus::Indeterminate => status = RevisionStatus::Indeterminate,
            RevisionStatus::Passed => {}
        }
    }
    status
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    /// Every revision passed.
    Valid,
    /// At least one revision failed.
    Invalid,
    /// Nothing failed, but something could not be decided.
    Pending,
}

impl fmt::Display for TreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TreeStatus::Valid => "valid",
            TreeStatus::Invalid => "invalid",
            TreeStatus::Pending => "pending",
        })
    }
}

/// Whole-tree report, results in canonical order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeVerification {
    pub status: TreeStatus,
    pub results: Vec<VerificationResult>,
}

impl TreeVerification {
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let status = match aggregate(results.iter().map(|r| r.status)) {
            RevisionStatus::Passed => TreeStatus::Valid,
            RevisionStatus::Failed => TreeStatus::Invalid,
            RevisionStatus::Indeterminate => TreeStatus::Pending,
        };
        Self { status, results }
    }

    pub fn is_valid(&self) -> bool {
        self.status == TreeStatus::Valid
    }

    pub fn result_for(&self, hash: &ContentHash) -> Option<&VerificationResult> {
        self.results.iter().find(|r| &r.hash == hash)
    }

    pub fn failed(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results
            .iter()
            .filter(|r| r.status == RevisionStatus::Failed)
    }
}
