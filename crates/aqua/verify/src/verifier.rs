//! Chain verifier.
//!
//! Every revision is checked independently: its key must equal the hash
//! recomputed from its fields, its predecessor must be in the tree, and its
//! payload must hold up (content hashes and leaves, link targets, signatures,
//! witness anchors). A tree is verified by running those checks over the
//! canonical order with bounded concurrency and aggregating once all are done.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use aqua_chain::{
    verify_signature, DeepLinkResolver, ResolveError, SignatureCheck, WitnessConfirmer,
    WitnessError,
};
use aqua_types::{
    form_content, hash, leaf_hashes, order_revisions, AquaTree, ContentHash, FileObject,
    FilePayload, FormPayload, LinkPayload, Revision, RevisionPayload, SignaturePayload,
    WitnessPayload,
};

use crate::cache::ContentCache;
use crate::config::VerifierConfig;
use crate::error::{FetchError, VerifyError};
use crate::fetch::{ContentFetcher, ContentReference};
use crate::report::{CheckKind, LogEntry, TreeVerification, VerificationResult};

/// What the verifier may consult besides the tree.
#[derive(Debug, Clone, Default)]
pub struct VerificationContext {
    /// File objects, matched to revisions by content hash, then by the name
    /// recorded in `file_index`. Files holding an AquaTree also serve as
    /// deep-link candidates.
    pub files: Vec<FileObject>,
    /// Trees attached to this one, searched first for link targets.
    pub linked_trees: Vec<AquaTree>,
    /// Further trees searched, in order, for deep-link targets.
    pub candidates: Vec<AquaTree>,
}

impl VerificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: FileObject) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_linked_tree(mut self, tree: AquaTree) -> Self {
        self.linked_trees.push(tree);
        self
    }

    pub fn with_candidate(mut self, tree: AquaTree) -> Self {
        self.candidates.push(tree);
        self
    }

    fn search_order(&self) -> Vec<AquaTree> {
        self.linked_trees
            .iter()
            .chain(self.candidates.iter())
            .cloned()
            .chain(self.files.iter().filter_map(FileObject::as_aqua_tree))
            .collect()
    }

    /// Inline content for a revision: by hash first, then by recorded name.
    fn supplied_content(
        &self,
        tree: &AquaTree,
        revision_hash: &ContentHash,
        expected: &ContentHash,
    ) -> Option<bytes::Bytes> {
        let inline = || self.files.iter().filter_map(|f| f.inline_bytes().map(|b| (f, b)));
        if let Some((_, bytes)) = inline().find(|(_, bytes)| &hash(bytes) == expected) {
            return Some(bytes);
        }
        let name = tree.file_index.get(revision_hash)?;
        inline()
            .find(|(file, _)| &file.file_name == name)
            .map(|(_, bytes)| bytes)
    }
}

pub struct ChainVerifier {
    config: VerifierConfig,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    confirmers: HashMap<String, Arc<dyn WitnessConfirmer>>,
    cache: Arc<ContentCache>,
}

impl ChainVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            fetcher: None,
            confirmers: HashMap::new(),
            cache: Arc::new(ContentCache::new()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Register the confirmer for one witness network.
    pub fn with_confirmer(
        mut self,
        network: impl Into<String>,
        confirmer: Arc<dyn WitnessConfirmer>,
    ) -> Self {
        self.confirmers.insert(network.into(), confirmer);
        self
    }

    /// Share a content cache across verifiers.
    pub fn with_cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Verify every revision in canonical order.
    ///
    /// A tree that does not order (no single head, broken or cyclic chain) is an
    /// error, unless some revision no longer hashes to its key. An edited
    /// revision can break the chain itself, so in that case every revision is
    /// still checked and reported in key order.
    pub async fn verify_tree(
        &self,
        tree: &AquaTree,
        context: &VerificationContext,
    ) -> Result<TreeVerification, VerifyError> {
        let order = match order_revisions(tree) {
            Ok(order) => order,
            Err(e) => {
                let edited = edited_revisions(tree);
                if edited.is_empty() {
                    return Err(e.into());
                }
                warn!(
                    error = %e,
                    edited = edited.len(),
                    "tree does not order, verifying revisions in key order"
                );
                tree.revisions.keys().copied().collect()
            }
        };
        let search = context.search_order();
        debug!(revisions = order.len(), concurrency = self.config.max_concurrency, "verifying tree");

        let results: Vec<VerificationResult> = stream::iter(order.iter())
            .map(|hash| self.verify_with(tree, hash, context, &search))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let verification = TreeVerification::from_results(results);
        info!(
            revisions = verification.results.len(),
            status = %verification.status,
            "tree verified"
        );
        Ok(verification)
    }

    /// [`verify_tree`](Self::verify_tree), abandoned as soon as `cancel` completes.
    pub async fn verify_tree_until<C>(
        &self,
        tree: &AquaTree,
        context: &VerificationContext,
        cancel: C,
    ) -> Result<TreeVerification, VerifyError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.verify_tree(tree, context) => result,
            _ = cancel => {
                warn!("verification cancelled");
                Err(VerifyError::Cancelled)
            }
        }
    }

    /// Verify a single revision of `tree`.
    pub async fn verify_revision(
        &self,
        tree: &AquaTree,
        revision_hash: &ContentHash,
        context: &VerificationContext,
    ) -> VerificationResult {
        let search = context.search_order();
        self.verify_with(tree, revision_hash, context, &search).await
    }

    async fn verify_with(
        &self,
        tree: &AquaTree,
        revision_hash: &ContentHash,
        context: &VerificationContext,
        search: &[AquaTree],
    ) -> VerificationResult {
        let Some(revision) = tree.get(revision_hash) else {
            return VerificationResult::from_logs(
                *revision_hash,
                None,
                vec![LogEntry::failed(CheckKind::HashMatch, "revision not in tree")],
            );
        };

        let mut logs = vec![check_hash(revision, revision_hash), check_predecessor(tree, revision)];

        match &revision.payload {
            RevisionPayload::File(file) => {
                logs.extend(self.check_file(tree, revision_hash, file, context).await)
            }
            RevisionPayload::Form(form) => logs.extend(check_form(form)),
            RevisionPayload::Link(link) => {
                logs.push(check_link(tree, revision_hash, link, search))
            }
            RevisionPayload::Signature(signature) => {
                logs.push(check_signature(revision, signature))
            }
            RevisionPayload::Witness(witness) => {
                logs.push(check_witness_anchor(revision, witness));
                if self.config.confirm_witnesses {
                    logs.push(self.confirm_witness(witness).await);
                }
            }
        }

        let result =
            VerificationResult::from_logs(*revision_hash, Some(revision.revision_type()), logs);
        debug!(
            revision = %revision_hash.short(),
            revision_type = %revision.revision_type(),
            status = %result.status,
            "revision verified"
        );
        result
    }

    async fn check_file(
        &self,
        tree: &AquaTree,
        revision_hash: &ContentHash,
        file: &FilePayload,
        context: &VerificationContext,
    ) -> Vec<LogEntry> {
        let bytes = if let Some(inline) = &file.content {
            bytes::Bytes::from(inline.clone().into_bytes())
        } else if let Some(bytes) = context.supplied_content(tree, revision_hash, &file.file_hash) {
            bytes
        } else {
            match self.fetch(tree, revision_hash, file, context).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return vec![LogEntry::indeterminate(
                        CheckKind::Content,
                        format!("content unavailable: {e}"),
                    )]
                }
            }
        };

        let mut logs = Vec::with_capacity(2);
        if hash(&bytes) == file.file_hash {
            logs.push(LogEntry::passed(CheckKind::Content, "file_hash matches content"));
        } else {
            logs.push(LogEntry::failed(CheckKind::Content, "file_hash does not match content"));
        }
        logs.push(match leaf_hashes(&bytes) {
            Ok(leaves) if leaves == file.leaves => {
                LogEntry::passed(CheckKind::Leaves, format!("{} leaves match", leaves.len()))
            }
            Ok(_) => LogEntry::failed(CheckKind::Leaves, "leaves do not match content"),
            Err(e) => LogEntry::failed(CheckKind::Leaves, e.to_string()),
        });
        logs
    }

    async fn fetch(
        &self,
        tree: &AquaTree,
        revision_hash: &ContentHash,
        file: &FilePayload,
        context: &VerificationContext,
    ) -> Result<bytes::Bytes, FetchError> {
        if let Some(cached) = self.cache.get(&file.file_hash) {
            return Ok(cached);
        }
        let fetcher = self
            .fetcher
            .clone()
            .ok_or_else(|| FetchError::ContentUnavailable {
                hash: file.file_hash,
                reason: "no content source".to_string(),
            })?;

        let url = tree.file_index.get(revision_hash).and_then(|name| {
            context
                .files
                .iter()
                .find(|f| &f.file_name == name)
                .and_then(|f| f.remote_url().map(str::to_string))
        });
        let reference = ContentReference {
            hash: file.file_hash,
            url,
        };

        let fetcher = fetcher.as_ref();
        let reference = &reference;
        let fetched = tokio::time::timeout(
            self.config.fetch_timeout(),
            self.cache.get_or_fetch(&file.file_hash, move || async move {
                let content = fetcher.fetch(reference).await?;
                if hash(&content.bytes) != reference.hash {
                    warn!(hash = %reference.hash.short(), "fetched content does not match its hash");
                    return Err(FetchError::ContentUnavailable {
                        hash: reference.hash,
                        reason: "fetched content does not match its hash".to_string(),
                    });
                }
                Ok(content.bytes)
            }),
        )
        .await;

        match fetched {
            Ok(result) => result,
            Err(_) => {
                warn!(hash = %file.file_hash.short(), "content fetch timed out");
                Err(FetchError::Timeout {
                    hash: file.file_hash,
                    after_ms: self.config.fetch_timeout_ms,
                })
            }
        }
    }

    async fn confirm_witness(&self, witness: &WitnessPayload) -> LogEntry {
        let network = &witness.witness_network;
        let Some(confirmer) = self.confirmers.get(network) else {
            return LogEntry::indeterminate(
                CheckKind::WitnessConfirmation,
                format!("no confirmer for network {network}"),
            );
        };

        let confirmed = tokio::time::timeout(
            self.config.witness_timeout(),
            confirmer.confirm(network, &witness.witness_transaction_hash),
        )
        .await;

        match confirmed {
            Err(_) => {
                warn!(network = %network, "witness confirmation timed out");
                LogEntry::indeterminate(
                    CheckKind::WitnessConfirmation,
                    format!("{network} timed out after {}ms", self.config.witness_timeout_ms),
                )
            }
            Ok(Err(e)) if e.is_transient() => {
                warn!(network = %network, error = %e, "witness network unavailable");
                LogEntry::indeterminate(CheckKind::WitnessConfirmation, e.to_string())
            }
            Ok(Err(e)) => LogEntry::failed(CheckKind::WitnessConfirmation, e.to_string()),
            Ok(Ok(confirmation)) if confirmation.anchored_hash != witness.witness_merkle_root => {
                let mismatch = WitnessError::AnchorMismatch {
                    expected: witness.witness_merkle_root,
                    found: confirmation.anchored_hash,
                };
                LogEntry::failed(CheckKind::WitnessConfirmation, mismatch.to_string())
            }
            Ok(Ok(confirmation)) => LogEntry::passed(
                CheckKind::WitnessConfirmation,
                format!(
                    "transaction {} on {} anchors {}",
                    confirmation.transaction_hash, network, confirmation.anchored_hash
                ),
            ),
        }
    }
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new(VerifierConfig::default())
    }
}

/// Revisions whose recomputed verification hash differs from their key.
fn edited_revisions(tree: &AquaTree) -> Vec<ContentHash> {
    tree.revisions
        .iter()
        .filter(|(key, revision)| revision.verification_hash().ok().as_ref() != Some(*key))
        .map(|(key, _)| *key)
        .collect()
}

fn check_hash(revision: &Revision, expected: &ContentHash) -> LogEntry {
    match revision.verification_hash() {
        Ok(computed) if &computed == expected => {
            LogEntry::passed(CheckKind::HashMatch, "verification hash matches")
        }
        Ok(computed) => LogEntry::failed(
            CheckKind::HashMatch,
            format!("expected {expected}, computed {computed}"),
        ),
        Err(e) => LogEntry::failed(CheckKind::HashMatch, format!("cannot hash revision: {e}")),
    }
}

fn check_predecessor(tree: &AquaTree, revision: &Revision) -> LogEntry {
    match revision.previous_verification_hash {
        None => LogEntry::passed(CheckKind::PredecessorLinkage, "genesis"),
        Some(previous) if tree.contains(&previous) => LogEntry::passed(
            CheckKind::PredecessorLinkage,
            format!("follows {}", previous.short()),
        ),
        Some(previous) => LogEntry::failed(
            CheckKind::PredecessorLinkage,
            format!("predecessor {previous} not in tree"),
        ),
    }
}

fn check_form(form: &FormPayload) -> Vec<LogEntry> {
    let content = match form_content(&form.fields) {
        Ok(content) => content,
        Err(e) => return vec![LogEntry::failed(CheckKind::Content, e.to_string())],
    };
    let content_log = if hash(&content) == form.file_hash {
        LogEntry::passed(CheckKind::Content, "file_hash matches form fields")
    } else {
        LogEntry::failed(CheckKind::Content, "file_hash does not match form fields")
    };
    let leaves_log = match leaf_hashes(&content) {
        Ok(leaves) if leaves == form.leaves => {
            LogEntry::passed(CheckKind::Leaves, format!("{} leaves match", leaves.len()))
        }
        Ok(_) => LogEntry::failed(CheckKind::Leaves, "leaves do not match form fields"),
        Err(e) => LogEntry::failed(CheckKind::Leaves, e.to_string()),
    };
    vec![content_log, leaves_log]
}

fn check_link(
    tree: &AquaTree,
    link_hash: &ContentHash,
    link: &LinkPayload,
    search: &[AquaTree],
) -> LogEntry {
    if link.link_verification_hashes.is_empty() {
        return LogEntry::failed(CheckKind::LinkResolution, "no link_verification_hashes");
    }
    match DeepLinkResolver::new(search).resolve(tree, link_hash) {
        Ok(resolution) if resolution.is_deep() => LogEntry::passed(
            CheckKind::LinkResolution,
            format!("deep link to {} resolved", resolution.file_name()),
        ),
        Ok(resolution) => LogEntry::passed(
            CheckKind::LinkResolution,
            format!("link to {}", resolution.file_name()),
        ),
        Err(e @ ResolveError::UnresolvedDeepLink { .. }) => {
            LogEntry::indeterminate(CheckKind::LinkResolution, e.to_string())
        }
        Err(e) => LogEntry::failed(CheckKind::LinkResolution, e.to_string()),
    }
}

fn check_signature(revision: &Revision, signature: &SignaturePayload) -> LogEntry {
    let Some(previous) = revision.previous_verification_hash else {
        return LogEntry::failed(CheckKind::Signature, "signature revision has no predecessor");
    };
    match verify_signature(signature, &previous) {
        SignatureCheck::Valid => LogEntry::passed(
            CheckKind::Signature,
            format!("signed by {}", signature.signature_wallet_address),
        ),
        SignatureCheck::Invalid(reason) => LogEntry::failed(CheckKind::Signature, reason),
        SignatureCheck::AddressMismatch { derived, recorded } => LogEntry::failed(
            CheckKind::Signature,
            format!("wallet address {recorded} does not match signer {derived}"),
        ),
        SignatureCheck::Unsupported(kind) => LogEntry::indeterminate(
            CheckKind::Signature,
            format!("unsupported signature type {kind}"),
        ),
    }
}

fn check_witness_anchor(revision: &Revision, witness: &WitnessPayload) -> LogEntry {
    match revision.previous_verification_hash {
        Some(previous) if previous == witness.witness_merkle_root => LogEntry::passed(
            CheckKind::WitnessAnchor,
            format!("anchors {}", previous.short()),
        ),
        Some(previous) => LogEntry::failed(
            CheckKind::WitnessAnchor,
            format!(
                "witness_merkle_root {} is not predecessor {}",
                witness.witness_merkle_root, previous
            ),
        ),
        None => LogEntry::failed(CheckKind::WitnessAnchor, "witness revision has no predecessor"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticContentFetcher;
    use crate::report::{RevisionStatus, TreeStatus};
    use aqua_chain::{
        AquaTreeWrapper, Ed25519Wallet, InMemoryWitnessLedger, RevisionBuilder, RevisionSigner, TreeLinker,
    };
    use aqua_types::TreeError;
    use std::collections::BTreeMap;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn signed_form() -> AquaTree {
        let builder = RevisionBuilder::default();
        let tree = builder
            .create_genesis_form("claim.json", fields(&[("domain", "example.com")]))
            .unwrap();
        builder
            .sign_revision(&tree, &Ed25519Wallet::from_secret([11u8; 32]))
            .unwrap()
    }

    #[tokio::test]
    async fn signed_form_is_valid() {
        let tree = signed_form();
        let report = ChainVerifier::default()
            .verify_tree(&tree, &VerificationContext::new())
            .await
            .unwrap();
        assert_eq!(report.status, TreeStatus::Valid);
        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.results.iter().map(|r| r.hash).collect::<Vec<_>>(),
            order_revisions(&tree).unwrap()
        );
    }

    #[tokio::test]
    async fn altered_wallet_address_fails_only_signature() {
        let tree = signed_form();
        let head = tree.head().unwrap();
        let mut tampered = tree.clone();
        if let Some(RevisionPayload::Signature(sig)) =
            tampered.revisions.get_mut(&head).map(|rev| &mut rev.payload)
        {
            sig.signature_wallet_address = Ed25519Wallet::from_secret([12u8; 32]).wallet_address();
        }

        let report = ChainVerifier::default()
            .verify_tree(&tampered, &VerificationContext::new())
            .await
            .unwrap();
        assert_eq!(report.status, TreeStatus::Invalid);
        assert_eq!(report.results[0].status, RevisionStatus::Passed);
        let sig = &report.results[1];
        assert_eq!(sig.status, RevisionStatus::Failed);
        assert_eq!(
            sig.log_for(CheckKind::Signature).unwrap().outcome,
            RevisionStatus::Failed
        );
    }

    #[tokio::test]
    async fn structural_errors_are_surfaced() {
        let mut tree = signed_form();
        let genesis = tree.genesis_hash().unwrap();
        tree.revisions.remove(&genesis);
        let err = ChainVerifier::default()
            .verify_tree(&tree, &VerificationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Tree(TreeError::BrokenChain { .. })));
    }

    #[tokio::test]
    async fn file_content_from_context_or_fetcher() {
        let builder = RevisionBuilder::default();
        let file = FileObject::from_bytes("scan.bin", vec![7u8; 3000]);
        let tree = builder.create_genesis_revision(&file).unwrap();
        let genesis = tree.head().unwrap();

        let missing = ChainVerifier::default()
            .verify_revision(&tree, &genesis, &VerificationContext::new())
            .await;
        assert_eq!(missing.status, RevisionStatus::Indeterminate);

        let from_context = ChainVerifier::default()
            .verify_revision(&tree, &genesis, &VerificationContext::new().with_file(file))
            .await;
        assert_eq!(from_context.status, RevisionStatus::Passed);
        assert_eq!(
            from_context.log_for(CheckKind::Leaves).unwrap().outcome,
            RevisionStatus::Passed
        );

        let fetcher = Arc::new(StaticContentFetcher::new());
        fetcher.insert(vec![7u8; 3000], None);
        let verifier = ChainVerifier::default().with_fetcher(fetcher.clone());
        for _ in 0..3 {
            let fetched = verifier
                .verify_revision(&tree, &genesis, &VerificationContext::new())
                .await;
            assert_eq!(fetched.status, RevisionStatus::Passed);
        }
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn supplied_file_is_matched_by_name() {
        let builder = RevisionBuilder::default();
        let tree = builder
            .create_genesis_revision(&FileObject::from_bytes("scan.bin", vec![0xff, 0xfe, 1, 2, 3]))
            .unwrap();
        let genesis = tree.head().unwrap();

        let altered = VerificationContext::new()
            .with_file(FileObject::from_bytes("scan.bin", vec![0xff, 0xfe, 9, 9, 9]));
        let report = ChainVerifier::default().verify_tree(&tree, &altered).await.unwrap();
        assert_eq!(report.status, TreeStatus::Invalid);
        assert_eq!(
            report.results[0].log_for(CheckKind::Content).unwrap().outcome,
            RevisionStatus::Failed
        );

        let unrelated = VerificationContext::new()
            .with_file(FileObject::from_bytes("other.bin", vec![9u8; 4]));
        let result = ChainVerifier::default()
            .verify_revision(&tree, &genesis, &unrelated)
            .await;
        assert_eq!(result.status, RevisionStatus::Indeterminate);
    }

    #[tokio::test]
    async fn mismatched_fetch_is_not_cached() {
        struct FirstResponseCorrupt {
            good: bytes::Bytes,
            calls: std::sync::atomic::AtomicUsize,
        }

        #[async_trait::async_trait]
        impl ContentFetcher for FirstResponseCorrupt {
            async fn fetch(
                &self,
                _reference: &ContentReference,
            ) -> Result<crate::fetch::FetchedContent, FetchError> {
                let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let bytes = if call == 0 {
                    bytes::Bytes::from_static(b"garbage")
                } else {
                    self.good.clone()
                };
                Ok(crate::fetch::FetchedContent {
                    bytes,
                    content_type: None,
                })
            }
        }

        let content = vec![5u8; 2048];
        let tree = RevisionBuilder::default()
            .create_genesis_revision(&FileObject::from_bytes("data.bin", content.clone()))
            .unwrap();
        let genesis = tree.head().unwrap();
        let fetcher = Arc::new(FirstResponseCorrupt {
            good: content.into(),
            calls: Default::default(),
        });
        let verifier = ChainVerifier::default().with_fetcher(fetcher.clone());
        let ctx = VerificationContext::new();

        let first = verifier.verify_revision(&tree, &genesis, &ctx).await;
        assert_eq!(first.status, RevisionStatus::Indeterminate);
        assert!(verifier.cache().is_empty());

        let second = verifier.verify_revision(&tree, &genesis, &ctx).await;
        assert_eq!(second.status, RevisionStatus::Passed);
        assert_eq!(fetcher.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(verifier.cache().len(), 1);
    }

    #[tokio::test]
    async fn edited_predecessor_is_reported_per_revision() {
        let builder = RevisionBuilder::default();
        let mut tree = builder
            .create_genesis_form("claim.json", fields(&[("a", "1")]))
            .unwrap();
        for value in ["2", "3"] {
            tree = builder.create_form_revision(&tree, fields(&[("a", value)])).unwrap();
        }
        let order = order_revisions(&tree).unwrap();
        let mut tampered = tree.clone();
        if let Some(revision) = tampered.revisions.get_mut(&order[1]) {
            revision.previous_verification_hash = Some(ContentHash::digest(b"x"));
        }
        assert!(order_revisions(&tampered).is_err());

        let report = ChainVerifier::default()
            .verify_tree(&tampered, &VerificationContext::new())
            .await
            .unwrap();
        assert_eq!(report.status, TreeStatus::Invalid);
        assert_eq!(report.results.len(), 3);
        for result in &report.results {
            let expected = if result.hash == order[1] {
                RevisionStatus::Failed
            } else {
                RevisionStatus::Passed
            };
            assert_eq!(result.status, expected);
        }
    }

    #[tokio::test]
    async fn embedded_tree_file_serves_deep_link() {
        let builder = RevisionBuilder::default();
        let host = builder
            .create_genesis_revision(&FileObject::from_text("contract.txt", "terms"))
            .unwrap();
        let target = builder
            .create_genesis_revision(&FileObject::from_text("id.txt", "identity"))
            .unwrap();
        let mut linked = TreeLinker::default()
            .link_aqua_tree(
                &AquaTreeWrapper::new(host),
                &AquaTreeWrapper::new(target.clone()),
            )
            .unwrap();
        linked.file_index.remove(&target.head().unwrap());

        let shipped = FileObject::from_text("id.txt.aqua.json", target.to_json_pretty().unwrap());
        let report = ChainVerifier::default()
            .verify_tree(&linked, &VerificationContext::new().with_file(shipped))
            .await
            .unwrap();
        assert_eq!(report.status, TreeStatus::Valid);
    }

    #[tokio::test]
    async fn tampered_inline_content_fails() {
        let builder = RevisionBuilder::default();
        let tree = builder
            .create_genesis_revision(&FileObject::from_text("note.txt", "original"))
            .unwrap();
        let genesis = tree.head().unwrap();
        let mut tampered = tree.clone();
        if let Some(RevisionPayload::File(file)) =
            tampered.revisions.get_mut(&genesis).map(|rev| &mut rev.payload)
        {
            file.content = Some("forged".to_string());
        }
        let result = ChainVerifier::default()
            .verify_revision(&tampered, &genesis, &VerificationContext::new())
            .await;
        assert_eq!(result.status, RevisionStatus::Failed);
        assert_eq!(
            result.log_for(CheckKind::Content).unwrap().outcome,
            RevisionStatus::Failed
        );
    }

    #[tokio::test]
    async fn witness_confirmation_outcomes() {
        let builder = RevisionBuilder::default();
        let tree = builder
            .create_genesis_form("claim.json", fields(&[("a", "b")]))
            .unwrap();
        let ledger = Arc::new(InMemoryWitnessLedger::new());
        let tx = ledger.anchor("sepolia", tree.head().unwrap()).unwrap();
        let tree = builder
            .witness_revision(&tree, "sepolia", &tx, ledger.as_ref())
            .await
            .unwrap();
        let ctx = VerificationContext::new();

        let confirmed = ChainVerifier::default()
            .with_confirmer("sepolia", ledger.clone())
            .verify_tree(&tree, &ctx)
            .await
            .unwrap();
        assert_eq!(confirmed.status, TreeStatus::Valid);

        let no_confirmer = ChainVerifier::default().verify_tree(&tree, &ctx).await.unwrap();
        assert_eq!(no_confirmer.status, TreeStatus::Pending);

        ledger.set_offline(true);
        let offline = ChainVerifier::default()
            .with_confirmer("sepolia", ledger.clone())
            .verify_tree(&tree, &ctx)
            .await
            .unwrap();
        assert_eq!(offline.status, TreeStatus::Pending);
        ledger.set_offline(false);

        let unconfirmed = ChainVerifier::new(VerifierConfig {
            confirm_witnesses: false,
            ..VerifierConfig::default()
        })
        .verify_tree(&tree, &ctx)
        .await
        .unwrap();
        assert_eq!(unconfirmed.status, TreeStatus::Valid);

        let other_ledger = Arc::new(InMemoryWitnessLedger::new());
        let not_found = ChainVerifier::default()
            .with_confirmer("sepolia", other_ledger)
            .verify_tree(&tree, &ctx)
            .await
            .unwrap();
        assert_eq!(not_found.status, TreeStatus::Invalid);
    }

    #[tokio::test]
    async fn deep_link_needs_candidate() {
        let builder = RevisionBuilder::default();
        let host = builder
            .create_genesis_revision(&FileObject::from_text("contract.txt", "terms"))
            .unwrap();
        let target = builder
            .create_genesis_revision(&FileObject::from_text("id.txt", "identity"))
            .unwrap();
        let mut linked = TreeLinker::default()
            .link_aqua_tree(
                &AquaTreeWrapper::new(host),
                &AquaTreeWrapper::new(target.clone()),
            )
            .unwrap();
        linked.file_index.remove(&target.head().unwrap());

        let without = ChainVerifier::default()
            .verify_tree(&linked, &VerificationContext::new())
            .await
            .unwrap();
        assert_eq!(without.status, TreeStatus::Pending);

        let with = ChainVerifier::default()
            .verify_tree(&linked, &VerificationContext::new().with_candidate(target))
            .await
            .unwrap();
        assert_eq!(with.status, TreeStatus::Valid);
    }

    #[tokio::test]
    async fn cancellation_abandons_verification() {
        struct StalledFetcher;

        #[async_trait::async_trait]
        impl ContentFetcher for StalledFetcher {
            async fn fetch(
                &self,
                _reference: &ContentReference,
            ) -> Result<crate::fetch::FetchedContent, FetchError> {
                std::future::pending().await
            }
        }

        let tree = RevisionBuilder::default()
            .create_genesis_revision(&FileObject::from_bytes("big.bin", vec![1u8; 10]))
            .unwrap();
        let snapshot = tree.clone();
        let verifier = ChainVerifier::default().with_fetcher(Arc::new(StalledFetcher));
        let err = verifier
            .verify_tree_until(&tree, &VerificationContext::new(), async {})
            .await
            .unwrap_err();
        assert_eq!(err, VerifyError::Cancelled);
        assert_eq!(tree, snapshot);
    }
}
