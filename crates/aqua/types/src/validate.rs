use tracing::debug;

use crate::error::TreeError;
use crate::hash::ContentHash;
use crate::revision::RevisionPayload;
use crate::tree::AquaTree;

/// Structural checks that need no content or cryptography: the chain orders,
/// `file_index` names the genesis, and every revision carries the fields its type
/// requires.
///
/// Returns the canonical order on success.
pub fn validate_structure(tree: &AquaTree) -> Result<Vec<ContentHash>, TreeError> {
    let order = crate::order::order_revisions(tree)?;

    if tree.file_index.is_empty() {
        return Err(TreeError::EmptyFileIndex);
    }
    let genesis = order[0];
    if !tree.file_index.contains_key(&genesis) {
        return Err(TreeError::UnnamedGenesis(genesis));
    }

    for hash in &order {
        let revision = tree
            .revisions
            .get(hash)
            .ok_or(TreeError::RevisionNotFound(*hash))?;
        match &revision.payload {
            RevisionPayload::Link(link) if link.link_verification_hashes.is_empty() => {
                return Err(TreeError::EmptyLink(*hash));
            }
            RevisionPayload::File(file) if file.leaves.is_empty() => {
                return Err(missing(*hash, "leaves"));
            }
            RevisionPayload::Form(form) if form.fields.is_empty() => {
                return Err(missing(*hash, "forms_*"));
            }
            RevisionPayload::Signature(sig) if sig.signature.is_empty() => {
                return Err(missing(*hash, "signature"));
            }
            RevisionPayload::Witness(w) if w.witness_transaction_hash.is_empty() => {
                return Err(missing(*hash, "witness_transaction_hash"));
            }
            _ => {}
        }
    }

    debug!(revisions = order.len(), genesis = %genesis.short(), "structure valid");
    Ok(order)
}

fn missing(hash: ContentHash, field: &str) -> TreeError {
    TreeError::MalformedRevision {
        field: field.to_string(),
        reason: format!("empty in revision {hash}"),
    }
}
