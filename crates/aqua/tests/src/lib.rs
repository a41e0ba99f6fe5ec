//! Shared fixtures for the Aqua end-to-end and property tests.

use std::collections::BTreeMap;

use aqua_chain::{ChainConfig, ChainError, Ed25519Wallet, RevisionBuilder};
use aqua_types::{AquaTree, FileObject};
use aqua_verify::{ChainVerifier, TreeVerification, VerificationContext, VerifierConfig, VerifyError};

pub fn builder() -> RevisionBuilder {
    RevisionBuilder::new(ChainConfig::default())
}

pub fn verifier() -> ChainVerifier {
    ChainVerifier::new(VerifierConfig::default())
}

/// Deterministic wallet; different seeds give different addresses.
pub fn wallet(seed: u8) -> Ed25519Wallet {
    Ed25519Wallet::from_secret([seed; 32])
}

pub fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A form genesis followed by one form revision per extra entry of `updates`.
pub fn form_chain(name: &str, updates: &[(&str, &str)]) -> Result<AquaTree, ChainError> {
    let builder = builder();
    let mut tree = builder.create_genesis_form(name, fields(&[("name", name)]))?;
    for (key, value) in updates {
        tree = builder.create_form_revision(&tree, fields(&[(*key, *value)]))?;
    }
    Ok(tree)
}

/// A text file genesis signed by `wallet(seed)`.
pub fn signed_document(file_name: &str, text: &str, seed: u8) -> Result<AquaTree, ChainError> {
    let builder = builder();
    let tree = builder.create_genesis_revision(&FileObject::from_text(file_name, text))?;
    builder.sign_revision(&tree, &wallet(seed))
}

pub async fn verify(
    tree: &AquaTree,
    context: &VerificationContext,
) -> Result<TreeVerification, VerifyError> {
    verifier().verify_tree(tree, context).await
}
