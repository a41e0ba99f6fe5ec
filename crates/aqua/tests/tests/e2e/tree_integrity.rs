//! End-to-end: ordering, serialization and tamper evidence of whole trees.

use aqua_chain::ChainError;
use aqua_tests::{builder, fields, form_chain, signed_document, verify};
use aqua_types::{
    validate_structure, AquaTree, FormPayload, Revision, RevisionPayload, TreeError,
};
use aqua_verify::{CheckKind, RevisionStatus, TreeStatus, VerificationContext, VerifyError};

#[tokio::test]
async fn json_round_trip_preserves_order_and_validity() {
    let tree = form_chain("ledger", &[("a", "1"), ("b", "2"), ("c", "3")]).unwrap();
    let json = tree.to_json_pretty().unwrap();
    let restored = AquaTree::from_json_str(&json).unwrap();

    assert_eq!(restored, tree);
    let before: Vec<_> = tree.ordered_revisions().unwrap().into_iter().map(|(h, _)| h).collect();
    let after: Vec<_> = restored
        .ordered_revisions()
        .unwrap()
        .into_iter()
        .map(|(h, _)| h)
        .collect();
    assert_eq!(before, after);

    let report = verify(&restored, &VerificationContext::new()).await.unwrap();
    assert!(report.is_valid());
    let reported: Vec<_> = report.results.iter().map(|r| r.hash).collect();
    assert_eq!(reported, before);
}

#[tokio::test]
async fn tree_view_is_optional_on_input() {
    let tree = form_chain("ledger", &[("a", "1")]).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&tree.to_json_pretty().unwrap()).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("tree");
    object.remove("treeMapping");

    let restored = AquaTree::from_json_value(value).unwrap();
    assert_eq!(restored.revisions, tree.revisions);
    assert_eq!(validate_structure(&restored).unwrap().len(), 2);
}

#[tokio::test]
async fn verification_is_idempotent() {
    let tree = signed_document("memo.txt", "quarterly numbers", 9).unwrap();
    let first = verify(&tree, &VerificationContext::new()).await.unwrap();
    let second = verify(&tree, &VerificationContext::new()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(tree.ordered_revisions().unwrap(), tree.ordered_revisions().unwrap());
}

#[tokio::test]
async fn tampering_fails_only_the_edited_revision() {
    let mut tree = form_chain("ledger", &[("a", "1"), ("b", "2"), ("c", "3")]).unwrap();
    let order: Vec<_> = tree.ordered_revisions().unwrap().into_iter().map(|(h, _)| h).collect();
    let edited = order[2];
    if let Some(RevisionPayload::Form(form)) =
        tree.revisions.get_mut(&edited).map(|r| &mut r.payload)
    {
        form.fields.insert("b".to_string(), "200".to_string());
    }

    let report = verify(&tree, &VerificationContext::new()).await.unwrap();
    assert_eq!(report.status, TreeStatus::Invalid);
    for (hash, result) in order.iter().zip(&report.results) {
        assert_eq!(&result.hash, hash);
        let expected = if *hash == edited {
            RevisionStatus::Failed
        } else {
            RevisionStatus::Passed
        };
        assert_eq!(result.status, expected, "revision {hash}");
    }
    let failed = report.result_for(&edited).unwrap();
    assert_eq!(failed.log_for(CheckKind::HashMatch).unwrap().outcome, RevisionStatus::Failed);
}

#[tokio::test]
async fn forked_tree_is_a_structural_error() {
    let tree = form_chain("ledger", &[("a", "1")]).unwrap();
    let genesis = tree.genesis_hash().unwrap();
    let mut forked = tree.clone();
    let sibling = Revision::new(
        Some(genesis),
        RevisionPayload::Form(FormPayload::from_fields(fields(&[("x", "9")]), "nonce".into()).unwrap()),
    );
    forked
        .revisions
        .insert(sibling.verification_hash().unwrap(), sibling);

    assert!(matches!(
        forked.ordered_revisions(),
        Err(TreeError::MultipleHeads(_))
    ));
    assert!(matches!(
        verify(&forked, &VerificationContext::new()).await,
        Err(VerifyError::Tree(TreeError::MultipleHeads(_)))
    ));
    assert!(matches!(
        builder().create_form_revision(&forked, fields(&[("y", "1")])),
        Err(ChainError::NoHead(TreeError::MultipleHeads(_)))
    ));
}

#[test]
fn delete_head_walks_back_to_genesis() {
    let b = builder();
    let tree = form_chain("ledger", &[("a", "1")]).unwrap();
    let head = tree.head().unwrap();
    let trimmed = b.delete_head(&tree).unwrap();

    assert_eq!(trimmed.len(), 1);
    assert!(!trimmed.contains(&head));
    assert_eq!(trimmed.head().unwrap(), tree.genesis_hash().unwrap());
    assert!(matches!(b.delete_head(&trimmed), Err(ChainError::LastRevision)));
}
