//! # Aqua Verify
//!
//! Independent verification of Aqua trees.
//!
//! [`ChainVerifier`] recomputes every revision's verification hash, checks
//! predecessor links, file content and Merkle leaves, link targets, signatures
//! and witness anchors, and reports one [`VerificationResult`] per revision in
//! canonical order. Content the verifier does not hold is resolved through a
//! [`ContentFetcher`] and shared through a [`ContentCache`].

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod report;
pub mod verifier;

pub use cache::ContentCache;
pub use config::VerifierConfig;
pub use error::{FetchError, VerifyError};
pub use fetch::{
    ContentFetcher, ContentReference, FetchedContent, HttpContentFetcher, StaticContentFetcher,
};
pub use report::{
    CheckKind, LogEntry, RevisionStatus, TreeStatus, TreeVerification, VerificationResult,
};
pub use verifier::{ChainVerifier, VerificationContext};
