//! End-to-end: links whose target the host does not name.

use aqua_chain::{AquaTreeWrapper, ChainConfig, DeepLinkResolver, ResolveError, TreeLinker};
use aqua_tests::{form_chain, verify};
use aqua_types::{AquaTree, ContentHash};
use aqua_verify::{CheckKind, RevisionStatus, TreeStatus, VerificationContext};

/// Host linked to a two-revision target, with the target head dropped from the
/// host's file index.
fn deep_linked() -> (AquaTree, AquaTree, ContentHash) {
    let host = form_chain("bundle", &[]).unwrap();
    let target = form_chain("attachment", &[("page", "2")]).unwrap();
    let mut linked = TreeLinker::new(ChainConfig::default())
        .link_aqua_tree(
            &AquaTreeWrapper::new(host),
            &AquaTreeWrapper::new(target.clone()),
        )
        .unwrap();
    linked.file_index.remove(&target.head().unwrap());
    let link = linked.head().unwrap();
    (linked, target, link)
}

#[test]
fn deep_link_is_detected() {
    let (linked, _, link) = deep_linked();
    assert!(DeepLinkResolver::is_deep_link(&linked, &link));
    assert!(!DeepLinkResolver::is_deep_link(&linked, &linked.genesis_hash().unwrap()));
}

#[test]
fn candidates_resolve_in_order() {
    let (linked, target, link) = deep_linked();
    let unrelated = form_chain("unrelated", &[]).unwrap();
    let candidates = vec![unrelated, target.clone()];

    let resolution = DeepLinkResolver::new(&candidates).resolve(&linked, &link).unwrap();
    assert!(resolution.is_deep());
    assert_eq!(resolution.target(), &target.head().unwrap());
    assert_eq!(resolution.file_name(), "attachment");

    assert!(matches!(
        DeepLinkResolver::new(&[]).resolve(&linked, &link),
        Err(ResolveError::UnresolvedDeepLink { .. })
    ));
}

#[tokio::test]
async fn verification_waits_on_missing_candidate() {
    let (linked, target, link) = deep_linked();

    let report = verify(&linked, &VerificationContext::new()).await.unwrap();
    assert_eq!(report.status, TreeStatus::Pending);
    assert_eq!(
        report.result_for(&link).unwrap().log_for(CheckKind::LinkResolution).unwrap().outcome,
        RevisionStatus::Indeterminate
    );

    let context = VerificationContext::new().with_candidate(target);
    let report = verify(&linked, &context).await.unwrap();
    assert_eq!(report.status, TreeStatus::Valid);
}
