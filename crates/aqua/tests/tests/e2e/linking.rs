//! End-to-end: linking trees onto one another.

use aqua_chain::{AquaTreeWrapper, ChainConfig, ChainError, TreeLinker};
use aqua_tests::{builder, form_chain, signed_document, verify};
use aqua_types::{FileObject, RevisionType, TreeError};
use aqua_verify::{TreeStatus, VerificationContext};

fn linker() -> TreeLinker {
    TreeLinker::new(ChainConfig::default())
}

#[tokio::test]
async fn linked_tree_resolves_from_host_alone() {
    let host = form_chain("invoice", &[("amount", "120")]).unwrap();
    let target = signed_document("receipt.txt", "paid in full", 4).unwrap();

    let linked = linker()
        .link_aqua_tree(
            &AquaTreeWrapper::new(host.clone()),
            &AquaTreeWrapper::new(target.clone()),
        )
        .unwrap();

    assert_eq!(linked.len(), host.len() + 1);
    let head = linked.get(&linked.head().unwrap()).unwrap();
    assert_eq!(head.revision_type(), RevisionType::Link);
    let link = head.as_link().unwrap();
    assert_eq!(link.link_verification_hashes, vec![target.head().unwrap()]);
    assert_eq!(link.link_file_hashes.len(), 1);
    assert_eq!(
        linked.file_index.get(&target.head().unwrap()).map(String::as_str),
        Some("receipt.txt")
    );

    let report = verify(&linked, &VerificationContext::new()).await.unwrap();
    assert_eq!(report.status, TreeStatus::Valid);
}

#[test]
fn linking_leaves_inputs_untouched() {
    let host = form_chain("invoice", &[]).unwrap();
    let target = form_chain("receipt", &[("paid", "yes")]).unwrap();
    let (host_before, target_before) = (host.clone(), target.clone());

    let host = AquaTreeWrapper::new(host);
    let target = AquaTreeWrapper::new(target);
    linker().link_aqua_tree(&host, &target).unwrap();

    assert_eq!(host.aqua_tree, host_before);
    assert_eq!(target.aqua_tree, target_before);
}

#[test]
fn self_link_is_cyclic() {
    let tree = AquaTreeWrapper::new(form_chain("loop", &[("a", "1")]).unwrap());
    assert!(matches!(
        linker().link_aqua_tree(&tree, &tree),
        Err(ChainError::CyclicLink(_))
    ));
}

#[test]
fn file_object_supplies_link_file_hash() {
    let file = FileObject::from_text("scan.txt", "scanned page");
    let target = builder().create_genesis_revision(&file).unwrap();
    let host = form_chain("case", &[]).unwrap();

    let linked = linker()
        .link_aqua_tree(
            &AquaTreeWrapper::new(host),
            &AquaTreeWrapper::new(target).with_file_object(file.clone()),
        )
        .unwrap();
    let link = linked.get(&linked.head().unwrap()).unwrap().as_link().unwrap().clone();
    assert_eq!(link.link_file_hashes, vec![file.content_hash().unwrap()]);
}

#[test]
fn pinned_host_revision_must_be_head() {
    let host = form_chain("invoice", &[("amount", "120")]).unwrap();
    let genesis = host.genesis_hash().unwrap();
    let target = form_chain("receipt", &[]).unwrap();

    let err = linker()
        .link_aqua_tree(
            &AquaTreeWrapper::new(host).with_revision(genesis),
            &AquaTreeWrapper::new(target),
        )
        .unwrap_err();
    assert!(matches!(err, ChainError::Tree(TreeError::NotHead { .. })));
}
