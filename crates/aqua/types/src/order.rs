//! Canonical revision ordering.
//!
//! The head is the unique revision that no other revision names as its
//! predecessor. Ordering walks predecessor pointers from the head down to the
//! genesis and reverses the result. Nothing here mutates the tree.

use std::collections::HashSet;

use crate::error::TreeError;
use crate::hash::ContentHash;
use crate::tree::AquaTree;

/// Revisions not referenced as any predecessor, in key order.
pub fn find_heads(tree: &AquaTree) -> Vec<ContentHash> {
    let referenced: HashSet<ContentHash> = tree
        .revisions
        .values()
        .filter_map(|rev| rev.previous_verification_hash)
        .collect();
    tree.revisions
        .keys()
        .filter(|hash| !referenced.contains(*hash))
        .copied()
        .collect()
}

pub fn head(tree: &AquaTree) -> Result<ContentHash, TreeError> {
    if tree.revisions.is_empty() {
        return Err(TreeError::EmptyTree);
    }
    let heads = find_heads(tree);
    match heads.len() {
        0 => Err(TreeError::NoHead),
        1 => Ok(heads[0]),
        _ => Err(TreeError::MultipleHeads(heads)),
    }
}

/// Verification hashes in chain order, genesis first.
pub fn order_revisions(tree: &AquaTree) -> Result<Vec<ContentHash>, TreeError> {
    let head = head(tree)?;

    let mut visited = HashSet::with_capacity(tree.revisions.len());
    let mut chain = Vec::with_capacity(tree.revisions.len());
    let mut current = head;
    loop {
        if !visited.insert(current) {
            return Err(TreeError::CyclicChain(current));
        }
        let revision = tree
            .revisions
            .get(&current)
            .ok_or(TreeError::RevisionNotFound(current))?;
        chain.push(current);

        match revision.previous_verification_hash {
            None => break,
            Some(previous) if tree.revisions.contains_key(&previous) => current = previous,
            Some(previous) => {
                return Err(TreeError::BrokenChain {
                    revision: current,
                    missing: previous,
                })
            }
        }
    }

    if chain.len() != tree.revisions.len() {
        let unreachable = tree
            .revisions
            .keys()
            .filter(|hash| !visited.contains(*hash))
            .copied()
            .collect();
        return Err(TreeError::UnreachableRevisions(unreachable));
    }

    chain.reverse();
    Ok(chain)
}

pub fn genesis_hash(tree: &AquaTree) -> Result<ContentHash, TreeError> {
    order_revisions(tree)?
        .first()
        .copied()
        .ok_or(TreeError::EmptyTree)
}
