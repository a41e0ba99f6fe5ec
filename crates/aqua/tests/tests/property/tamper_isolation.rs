//! Property tests: editing one field of one revision in place fails that
//! revision and no other, because its successors still reference the original
//! hash.

use aqua_chain::RevisionSigner;
use aqua_tests::{builder, fields, form_chain, wallet};
use aqua_types::{AquaTree, ContentHash, LocalTimestamp, RevisionPayload};
use aqua_verify::{RevisionStatus, TreeStatus, VerificationContext};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Field {
    Payload,
    Previous,
    Timestamp,
}

fn field() -> impl Strategy<Value = Field> {
    prop_oneof![
        Just(Field::Payload),
        Just(Field::Previous),
        Just(Field::Timestamp),
    ]
}

/// Form chain of `length` updates, closed by a signature revision.
fn signed_chain(length: usize) -> AquaTree {
    let updates: Vec<(String, String)> =
        (0..length).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
    let borrowed: Vec<(&str, &str)> =
        updates.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let tree = form_chain("ledger", &borrowed).unwrap();
    builder().sign_revision(&tree, &wallet(3)).unwrap()
}

fn edit(tree: &mut AquaTree, target: &ContentHash, field: Field, replacement: &str) {
    let Some(revision) = tree.revisions.get_mut(target) else {
        return;
    };
    match field {
        Field::Previous => {
            revision.previous_verification_hash = Some(ContentHash::digest(replacement.as_bytes()))
        }
        Field::Timestamp => {
            revision.local_timestamp = LocalTimestamp::parse("20000101000000").unwrap()
        }
        Field::Payload => match &mut revision.payload {
            RevisionPayload::Form(form) => {
                form.fields = fields(&[("tampered", replacement)]);
            }
            RevisionPayload::Signature(signature) => {
                signature.signature_wallet_address = wallet(9).wallet_address();
            }
            other => panic!("unexpected payload {other:?}"),
        },
    }
}

proptest! {
    #[test]
    fn only_the_edited_revision_fails(
        length in 1usize..8,
        pick in any::<prop::sample::Index>(),
        field in field(),
        replacement in "[a-z]{1,10}",
    ) {
        let mut tree = signed_chain(length);
        let order: Vec<_> = tree.ordered_revisions().unwrap().into_iter().map(|(h, _)| h).collect();
        let edited = order[pick.index(order.len())];
        edit(&mut tree, &edited, field, &replacement);

        let rt = tokio::runtime::Runtime::new().unwrap();
        let report = rt
            .block_on(aqua_tests::verify(&tree, &VerificationContext::new()))
            .unwrap();

        prop_assert_eq!(report.status, TreeStatus::Invalid);
        prop_assert_eq!(report.results.len(), order.len());
        for result in &report.results {
            if result.hash == edited {
                prop_assert_eq!(result.status, RevisionStatus::Failed);
            } else {
                prop_assert_eq!(result.status, RevisionStatus::Passed);
            }
        }
    }
}
