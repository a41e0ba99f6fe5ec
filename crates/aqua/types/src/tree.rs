use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TreeError;
use crate::hash::ContentHash;
use crate::order;
use crate::revision::Revision;

/// One document's provenance: every revision keyed by its verification hash, plus
/// the names of the content it references.
///
/// Map order is not chain order. Chain order is derived with
/// [`order::order_revisions`]. `tree` and `tree_mapping` are derived views kept
/// for consumers of the wire format; they are recomputed on every change and are
/// optional on input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AquaTree {
    pub revisions: BTreeMap<ContentHash, Revision>,
    pub file_index: BTreeMap<ContentHash, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
    #[serde(
        rename = "treeMapping",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tree_mapping: Option<TreeMapping>,
}

/// Nested `{hash, children}` view of the chain, genesis at the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub hash: ContentHash,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// Path from the genesis to every leaf, plus the latest revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeMapping {
    pub paths: BTreeMap<ContentHash, Vec<ContentHash>>,
    #[serde(rename = "latestHash")]
    pub latest_hash: ContentHash,
}

impl AquaTree {
    /// Start a tree from a genesis revision. `name` is the document name recorded
    /// in `file_index` for the genesis.
    pub fn from_genesis(
        genesis: Revision,
        name: impl Into<String>,
    ) -> Result<(Self, ContentHash), TreeError> {
        if let Some(previous) = genesis.previous_verification_hash {
            return Err(TreeError::NotHead {
                expected: None,
                found: Some(previous),
            });
        }
        let hash = genesis.verification_hash()?;
        let mut tree = Self::default();
        tree.revisions.insert(hash, genesis);
        tree.file_index.insert(hash, name.into());
        tree.refresh_views();
        Ok((tree, hash))
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&Revision> {
        self.revisions.get(hash)
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.revisions.contains_key(hash)
    }

    pub fn head(&self) -> Result<ContentHash, TreeError> {
        order::head(self)
    }

    pub fn genesis_hash(&self) -> Result<ContentHash, TreeError> {
        order::genesis_hash(self)
    }

    /// Name recorded for the genesis revision.
    pub fn document_name(&self) -> Result<&str, TreeError> {
        let genesis = self.genesis_hash()?;
        self.file_index
            .get(&genesis)
            .map(String::as_str)
            .ok_or(TreeError::UnnamedGenesis(genesis))
    }

    /// Revisions in chain order, genesis first.
    pub fn ordered_revisions(&self) -> Result<Vec<(ContentHash, &Revision)>, TreeError> {
        let order = order::order_revisions(self)?;
        order
            .into_iter()
            .map(|hash| {
                self.revisions
                    .get(&hash)
                    .map(|rev| (hash, rev))
                    .ok_or(TreeError::RevisionNotFound(hash))
            })
            .collect()
    }

    /// New tree with `revision` appended onto the current head.
    ///
    /// The revision's predecessor must be the head. The receiver is unchanged.
    pub fn with_appended(&self, revision: Revision) -> Result<(Self, ContentHash), TreeError> {
        let head = self.head()?;
        if revision.previous_verification_hash != Some(head) {
            return Err(TreeError::NotHead {
                expected: Some(head),
                found: revision.previous_verification_hash,
            });
        }
        let hash = revision.verification_hash()?;
        if self.revisions.contains_key(&hash) {
            return Err(TreeError::DuplicateRevision(hash));
        }

        let mut next = self.clone();
        next.revisions.insert(hash, revision);
        next.refresh_views();
        Ok((next, hash))
    }

    /// New tree without the current head. History below the head is untouched.
    pub fn remove_head(&self) -> Result<(Self, ContentHash), TreeError> {
        let head = self.head()?;
        let mut next = self.clone();
        next.revisions.remove(&head);
        next.file_index.remove(&head);
        next.refresh_views();
        Ok((next, head))
    }

    /// Recompute `tree` and `tree_mapping`. Both are cleared when the chain does
    /// not order.
    pub fn refresh_views(&mut self) {
        match order::order_revisions(self) {
            Ok(order) => {
                self.tree = build_node(&order);
                self.tree_mapping = order.last().map(|latest| {
                    let mut paths = BTreeMap::new();
                    paths.insert(*latest, order.clone());
                    TreeMapping {
                        paths,
                        latest_hash: *latest,
                    }
                });
            }
            Err(_) => {
                self.tree = None;
                self.tree_mapping = None;
            }
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, TreeError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn build_node(order: &[ContentHash]) -> Option<TreeNode> {
    let mut node: Option<TreeNode> = None;
    for hash in order.iter().rev() {
        node = Some(TreeNode {
            hash: *hash,
            children: node.into_iter().collect(),
        });
    }
    node
}
