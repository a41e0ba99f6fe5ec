//! # Aqua Types
//!
//! Core data model for Aqua provenance trees.
//!
//! An [`AquaTree`] records one document's history as a hash chain of revisions,
//! each identified by the BLAKE3 hash of its canonical serialization and pointing
//! at its predecessor. The first revision (the genesis) has no predecessor; the
//! head is the one revision nothing points at.
//!
//! This crate covers:
//! - [`ContentHash`] and canonical JSON hashing
//! - Merkle leaves and inclusion proofs over file content
//! - The [`Revision`] envelope and its typed payloads
//! - The [`AquaTree`] aggregate with append and head removal
//! - Canonical ordering and structural validation
//! - [`FileObject`], the raw content behind file revisions

#![deny(unsafe_code)]

pub mod error;
pub mod file;
pub mod hash;
pub mod merkle;
pub mod order;
pub mod revision;
pub mod timestamp;
pub mod tree;
pub mod validate;

pub use error::{MerkleError, TreeError};
pub use file::{FileContent, FileObject};
pub use hash::{canonical_json, hash, hash_canonical, ContentHash, ContentHashError};
pub use merkle::{leaf_hashes, MerkleProof, MerkleTree, LEAF_SIZE};
pub use order::{find_heads, genesis_hash, head, order_revisions};
pub use revision::{
    form_content, FilePayload, FormPayload, LinkPayload, Revision, RevisionPayload, RevisionType,
    SignaturePayload, SignatureType, WitnessPayload, FORM_KEY_PREFIX, PROTOCOL_VERSION,
};
pub use timestamp::LocalTimestamp;
pub use tree::{AquaTree, TreeMapping, TreeNode};
pub use validate::validate_structure;
