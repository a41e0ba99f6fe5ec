//! Merkle tree over fixed-size content leaves.
//!
//! `file` and `form` revisions record the leaf hashes of their content so that a
//! single chunk can be checked against the root without rehashing the whole
//! payload. Leaves are taken in content order; an odd node at any level is paired
//! with itself. Leaf and inner-node hashes are domain separated.
//!
//! ```text
//!          root
//!        /      \
//!     H(a,b)   H(c,c)
//!     /   \      |
//!   L(a) L(b)   L(c)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::MerkleError;
use crate::hash::ContentHash;

/// Fixed leaf size in bytes.
pub const LEAF_SIZE: usize = 1024;

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

/// Hash one content chunk as a leaf.
pub fn hash_leaf(chunk: &[u8]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[LEAF_TAG]);
    hasher.update(chunk);
    ContentHash::from_bytes(*hasher.finalize().as_bytes())
}

fn hash_node(left: &ContentHash, right: &ContentHash) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[NODE_TAG]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    ContentHash::from_bytes(*hasher.finalize().as_bytes())
}

/// Leaf hashes for `content`, chunked at [`LEAF_SIZE`].
pub fn leaf_hashes(content: &[u8]) -> Result<Vec<ContentHash>, MerkleError> {
    if content.is_empty() {
        return Err(MerkleError::EmptyContent);
    }
    Ok(content.chunks(LEAF_SIZE).map(hash_leaf).collect())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` are the leaves, the last level holds the root alone.
    levels: Vec<Vec<ContentHash>>,
}

impl MerkleTree {
    pub fn from_content(content: &[u8]) -> Result<Self, MerkleError> {
        Self::from_leaves(leaf_hashes(content)?)
    }

    pub fn from_leaves(leaves: Vec<ContentHash>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyContent);
        }
        let mut levels = vec![leaves];
        while levels.last().map_or(0, Vec::len) > 1 {
            let current = &levels[levels.len() - 1];
            let next: Vec<ContentHash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_node(left, right),
                    [single] => hash_node(single, single),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    pub fn leaves(&self) -> &[ContentHash] {
        &self.levels[0]
    }

    pub fn root(&self) -> ContentHash {
        self.levels[self.levels.len() - 1][0]
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let len = self.leaves().len();
        if index >= len {
            return Err(MerkleError::LeafOutOfRange { index, len });
        }

        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let is_right = position % 2 == 1;
            let sibling_index = if is_right { position - 1 } else { position + 1 };
            let sibling = level.get(sibling_index).copied().unwrap_or(level[position]);
            siblings.push(ProofStep {
                hash: sibling,
                sibling_on_left: is_right,
            });
            position /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index,
            leaf: self.leaves()[index],
            siblings,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub hash: ContentHash,
    pub sibling_on_left: bool,
}

/// Path from one leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub leaf: ContentHash,
    pub siblings: Vec<ProofStep>,
}

impl MerkleProof {
    /// Recompute the root from the leaf and compare.
    pub fn verify(&self, root: &ContentHash) -> bool {
        let computed = self.siblings.iter().fold(self.leaf, |acc, step| {
            if step.sibling_on_left {
                hash_node(&step.hash, &acc)
            } else {
                hash_node(&acc, &step.hash)
            }
        });
        &computed == root
    }

    /// Check a raw chunk against this proof.
    pub fn verify_chunk(&self, chunk: &[u8], root: &ContentHash) -> bool {
        hash_leaf(chunk) == self.leaf && self.verify(root)
    }
}
