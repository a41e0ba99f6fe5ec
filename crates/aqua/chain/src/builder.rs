//! Revision builder.
//!
//! Every operation takes a tree by reference and returns a new tree with one
//! revision appended (or, for [`RevisionBuilder::delete_head`], removed). The
//! input is never modified, so callers can keep the previous version around.

use rand::RngCore;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use aqua_types::{
    leaf_hashes, AquaTree, ContentHash, FileObject, FilePayload, FormPayload, Revision,
    RevisionPayload, SignaturePayload, WitnessPayload,
};

use crate::config::ChainConfig;
use crate::error::{ChainError, WitnessError};
use crate::signer::{verify_signature, RevisionSigner, SignatureCheck};
use crate::witness::WitnessConfirmer;

#[derive(Debug, Clone, Default)]
pub struct RevisionBuilder {
    config: ChainConfig,
}

impl RevisionBuilder {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Start a tree from file content.
    pub fn create_genesis_revision(&self, content: &FileObject) -> Result<AquaTree, ChainError> {
        let payload = file_payload(content)?;
        let revision = self.revision(None, RevisionPayload::File(payload));
        let (tree, hash) = AquaTree::from_genesis(revision, content.file_name.clone())?;
        info!(genesis = %hash.short(), name = %content.file_name, "created file genesis");
        Ok(tree)
    }

    /// Start a tree from a field map.
    pub fn create_genesis_form(
        &self,
        name: &str,
        fields: BTreeMap<String, String>,
    ) -> Result<AquaTree, ChainError> {
        let payload = form_payload(fields)?;
        let revision = self.revision(None, RevisionPayload::Form(payload));
        let (tree, hash) = AquaTree::from_genesis(revision, name)?;
        info!(genesis = %hash.short(), name, "created form genesis");
        Ok(tree)
    }

    pub fn create_form_revision(
        &self,
        tree: &AquaTree,
        fields: BTreeMap<String, String>,
    ) -> Result<AquaTree, ChainError> {
        let head = current_head(tree)?;
        let payload = form_payload(fields)?;
        let (next, hash) = tree.with_appended(self.revision(Some(head), RevisionPayload::Form(payload)))?;
        debug!(revision = %hash.short(), previous = %head.short(), "appended form revision");
        Ok(next)
    }

    /// Append a file revision and name it in `file_index`.
    pub fn create_file_revision(
        &self,
        tree: &AquaTree,
        file_object: &FileObject,
    ) -> Result<AquaTree, ChainError> {
        let head = current_head(tree)?;
        let payload = file_payload(file_object)?;
        let (mut next, hash) =
            tree.with_appended(self.revision(Some(head), RevisionPayload::File(payload)))?;
        next.file_index.insert(hash, file_object.file_name.clone());
        debug!(
            revision = %hash.short(),
            previous = %head.short(),
            name = %file_object.file_name,
            "appended file revision"
        );
        Ok(next)
    }

    /// Append a signature over the current head.
    pub fn sign_revision(
        &self,
        tree: &AquaTree,
        signer: &dyn RevisionSigner,
    ) -> Result<AquaTree, ChainError> {
        let head = current_head(tree)?;
        let signature = signer.sign(head.as_bytes()).map_err(ChainError::Signature)?;
        let payload = SignaturePayload {
            signature,
            signature_type: signer.signature_type(),
            signature_wallet_address: signer.wallet_address(),
            signature_public_key: signer.public_key_hex(),
        };

        match verify_signature(&payload, &head) {
            SignatureCheck::Valid => {}
            SignatureCheck::Unsupported(kind) => {
                warn!(signature_type = %kind, "cannot check signature type locally");
            }
            SignatureCheck::Invalid(reason) => return Err(ChainError::Signature(reason)),
            SignatureCheck::AddressMismatch { derived, recorded } => {
                return Err(ChainError::Signature(format!(
                    "signer reports address {recorded}, key derives {derived}"
                )))
            }
        }

        let (next, hash) =
            tree.with_appended(self.revision(Some(head), RevisionPayload::Signature(payload)))?;
        info!(
            revision = %hash.short(),
            signed = %head.short(),
            wallet = %signer.wallet_address(),
            "appended signature revision"
        );
        Ok(next)
    }

    /// Append a witness revision once `confirmer` shows `transaction_hash` anchors
    /// the current head on `network`. Bounded by `witness_timeout_ms`; no retries.
    pub async fn witness_revision(
        &self,
        tree: &AquaTree,
        network: &str,
        transaction_hash: &str,
        confirmer: &dyn WitnessConfirmer,
    ) -> Result<AquaTree, ChainError> {
        let head = current_head(tree)?;
        let timeout = Duration::from_millis(self.config.witness_timeout_ms);

        let confirmation = match tokio::time::timeout(
            timeout,
            confirmer.confirm(network, transaction_hash),
        )
        .await
        {
            Ok(Ok(confirmation)) => confirmation,
            Ok(Err(e)) => {
                warn!(network, transaction = transaction_hash, error = %e, "witness confirmation failed");
                return Err(ChainError::WitnessUnavailable(e));
            }
            Err(_) => {
                warn!(network, transaction = transaction_hash, "witness confirmation timed out");
                return Err(ChainError::WitnessUnavailable(WitnessError::Timeout {
                    network: network.to_string(),
                    after_ms: self.config.witness_timeout_ms,
                }));
            }
        };

        if confirmation.anchored_hash != head {
            return Err(ChainError::WitnessUnavailable(WitnessError::AnchorMismatch {
                expected: head,
                found: confirmation.anchored_hash,
            }));
        }

        let payload = WitnessPayload {
            witness_network: network.to_string(),
            witness_transaction_hash: confirmation.transaction_hash,
            witness_timestamp: confirmation.timestamp,
            witness_sender_account_address: confirmation.sender,
            witness_smart_contract_address: confirmation.contract,
            witness_merkle_root: head,
        };
        let (next, hash) =
            tree.with_appended(self.revision(Some(head), RevisionPayload::Witness(payload)))?;
        info!(revision = %hash.short(), witnessed = %head.short(), network, "appended witness revision");
        Ok(next)
    }

    /// Remove the head revision. The genesis cannot be removed.
    pub fn delete_head(&self, tree: &AquaTree) -> Result<AquaTree, ChainError> {
        let head = current_head(tree)?;
        let is_genesis = tree.get(&head).map_or(false, Revision::is_genesis);
        if is_genesis {
            return Err(ChainError::LastRevision);
        }
        let (next, removed) = tree.remove_head()?;
        info!(removed = %removed.short(), "deleted head revision");
        Ok(next)
    }

    fn revision(&self, previous: Option<ContentHash>, payload: RevisionPayload) -> Revision {
        Revision::new(previous, payload).with_version(self.config.protocol_version.clone())
    }
}

fn current_head(tree: &AquaTree) -> Result<ContentHash, ChainError> {
    tree.head().map_err(ChainError::NoHead)
}

fn file_payload(file: &FileObject) -> Result<FilePayload, ChainError> {
    let bytes = file
        .inline_bytes()
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ChainError::EmptyContent)?;
    let content = match &file.content {
        aqua_types::FileContent::Text(text) => Some(text.clone()),
        _ => None,
    };
    Ok(FilePayload {
        file_hash: ContentHash::digest(&bytes),
        file_nonce: new_nonce(),
        leaves: leaf_hashes(&bytes).map_err(|_| ChainError::EmptyContent)?,
        content,
    })
}

fn form_payload(fields: BTreeMap<String, String>) -> Result<FormPayload, ChainError> {
    if fields.is_empty() {
        return Err(ChainError::EmptyContent);
    }
    Ok(FormPayload::from_fields(fields, new_nonce())?)
}

fn new_nonce() -> String {
    let mut nonce = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut nonce);
    hex::encode(nonce)
}
