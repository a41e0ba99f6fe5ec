//! End-to-end: a document is created, signed and witnessed, then verified.

use std::sync::Arc;

use aqua_chain::{ChainError, InMemoryWitnessLedger, RevisionSigner, WitnessError};
use aqua_tests::{builder, signed_document, verifier, verify, wallet};
use aqua_types::{FileObject, RevisionPayload, RevisionType};
use aqua_verify::{CheckKind, RevisionStatus, TreeStatus, VerificationContext};

#[tokio::test]
async fn signed_document_is_valid() {
    let tree = signed_document("contract.txt", "the parties agree", 1).unwrap();
    let report = verify(&tree, &VerificationContext::new()).await.unwrap();

    assert_eq!(report.status, TreeStatus::Valid);
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.success));

    let signature = &report.results[1];
    assert_eq!(signature.revision_type, Some(RevisionType::Signature));
    assert_eq!(
        signature.log_for(CheckKind::Signature).unwrap().outcome,
        RevisionStatus::Passed
    );
}

#[tokio::test]
async fn recorded_wallet_must_match_key() {
    let mut tree = signed_document("contract.txt", "the parties agree", 1).unwrap();
    let head = tree.head().unwrap();
    let genesis = tree.genesis_hash().unwrap();
    if let Some(RevisionPayload::Signature(sig)) =
        tree.revisions.get_mut(&head).map(|r| &mut r.payload)
    {
        sig.signature_wallet_address = wallet(2).wallet_address();
    }

    let report = verify(&tree, &VerificationContext::new()).await.unwrap();
    assert_eq!(report.status, TreeStatus::Invalid);
    assert!(report.result_for(&genesis).unwrap().success);

    let signed = report.result_for(&head).unwrap();
    assert_eq!(signed.status, RevisionStatus::Failed);
    assert_eq!(
        signed.log_for(CheckKind::Signature).unwrap().outcome,
        RevisionStatus::Failed
    );
}

#[tokio::test]
async fn co_signers_each_sign_their_predecessor() {
    let b = builder();
    let tree = b
        .create_genesis_revision(&FileObject::from_text("nda.md", "# NDA"))
        .unwrap();
    let tree = b.sign_revision(&tree, &wallet(1)).unwrap();
    let tree = b.sign_revision(&tree, &wallet(2)).unwrap();

    let ordered = tree.ordered_revisions().unwrap();
    let addresses: Vec<String> = ordered
        .iter()
        .filter_map(|(_, r)| r.as_signature())
        .map(|s| s.signature_wallet_address.clone())
        .collect();
    assert_eq!(addresses, vec![wallet(1).wallet_address(), wallet(2).wallet_address()]);

    let report = verify(&tree, &VerificationContext::new()).await.unwrap();
    assert!(report.is_valid());
}

#[tokio::test]
async fn witnessed_document_confirms_against_ledger() {
    let ledger = Arc::new(InMemoryWitnessLedger::new());
    let tree = signed_document("deed.txt", "lot 42", 3).unwrap();
    let tx = ledger.anchor("sepolia", tree.head().unwrap()).unwrap();
    let tree = builder()
        .witness_revision(&tree, "sepolia", &tx, ledger.as_ref())
        .await
        .unwrap();

    let witness = tree.get(&tree.head().unwrap()).unwrap().as_witness().unwrap();
    assert_eq!(witness.witness_transaction_hash, tx);

    let report = verifier()
        .with_confirmer("sepolia", ledger.clone())
        .verify_tree(&tree, &VerificationContext::new())
        .await
        .unwrap();
    assert_eq!(report.status, TreeStatus::Valid);

    ledger.set_offline(true);
    let report = verifier()
        .with_confirmer("sepolia", ledger.clone())
        .verify_tree(&tree, &VerificationContext::new())
        .await
        .unwrap();
    assert_eq!(report.status, TreeStatus::Pending);
    assert!(report.failed().next().is_none());
}

#[tokio::test]
async fn witness_of_stale_head_is_rejected() {
    let ledger = InMemoryWitnessLedger::new();
    let tree = signed_document("deed.txt", "lot 42", 3).unwrap();
    let tx = ledger.anchor("sepolia", tree.genesis_hash().unwrap()).unwrap();

    let err = builder()
        .witness_revision(&tree, "sepolia", &tx, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChainError::WitnessUnavailable(WitnessError::AnchorMismatch { .. })
    ));
}
