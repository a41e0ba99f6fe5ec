//! Property tests: any chain built through the builder orders genesis-first,
//! links each revision to the one before it, and survives a JSON round trip.

use aqua_tests::{builder, fields};
use aqua_types::{AquaTree, FileObject};
use proptest::prelude::*;

fn arb_field() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,8}", "[ -~]{0,24}")
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_field().prop_map(|(k, v)| Step::Form(k, v)),
        "[a-z]{1,12}".prop_map(Step::File),
        (1u8..=255).prop_map(Step::Sign),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Form(String, String),
    File(String),
    Sign(u8),
}

fn build(steps: &[Step]) -> AquaTree {
    let b = builder();
    let mut tree = b
        .create_genesis_form("doc", fields(&[("title", "doc")]))
        .unwrap();
    for step in steps {
        tree = match step {
            Step::Form(k, v) => b
                .create_form_revision(&tree, fields(&[(k.as_str(), v.as_str())]))
                .unwrap(),
            Step::File(text) => b
                .create_file_revision(&tree, &FileObject::from_text(format!("{text}.txt"), text.clone()))
                .unwrap(),
            Step::Sign(seed) => b.sign_revision(&tree, &aqua_tests::wallet(*seed)).unwrap(),
        };
    }
    tree
}

proptest! {
    #[test]
    fn order_is_genesis_first_and_linked(steps in prop::collection::vec(arb_step(), 0..12)) {
        let tree = build(&steps);
        let ordered = tree.ordered_revisions().unwrap();

        prop_assert_eq!(ordered.len(), steps.len() + 1);
        prop_assert!(ordered[0].1.is_genesis());
        prop_assert_eq!(ordered[0].0, tree.genesis_hash().unwrap());
        prop_assert_eq!(ordered[ordered.len() - 1].0, tree.head().unwrap());
        for pair in ordered.windows(2) {
            prop_assert_eq!(pair[1].1.previous_verification_hash, Some(pair[0].0));
        }
    }

    #[test]
    fn json_round_trip_is_lossless(steps in prop::collection::vec(arb_step(), 0..8)) {
        let tree = build(&steps);
        let restored = AquaTree::from_json_str(&tree.to_json_pretty().unwrap()).unwrap();
        prop_assert_eq!(&restored, &tree);
        for (hash, revision) in &restored.revisions {
            prop_assert_eq!(revision.verification_hash().unwrap(), *hash);
        }
    }

    #[test]
    fn built_chains_verify(steps in prop::collection::vec(arb_step(), 0..6)) {
        let tree = build(&steps);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let report = rt
            .block_on(aqua_tests::verify(&tree, &Default::default()))
            .unwrap();
        prop_assert!(report.is_valid(), "{:?}", report.failed().collect::<Vec<_>>());
    }
}
