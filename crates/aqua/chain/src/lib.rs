//! # Aqua Chain
//!
//! Building and linking Aqua trees.
//!
//! - [`RevisionBuilder`] creates genesis revisions and appends form, file,
//!   signature and witness revisions onto the head of a tree
//! - [`TreeLinker`] points one tree at another with a link revision
//! - [`DeepLinkResolver`] finds the target of a link, searching companion trees
//!   when the host does not name it
//! - [`RevisionSigner`] and [`WitnessConfirmer`] are the boundaries to wallets and
//!   witness networks

#![deny(unsafe_code)]

pub mod builder;
pub mod config;
pub mod error;
pub mod linker;
pub mod resolver;
pub mod signer;
pub mod witness;

pub use builder::RevisionBuilder;
pub use config::ChainConfig;
pub use error::{ChainError, ResolveError, WitnessError};
pub use linker::{AquaTreeWrapper, TreeLinker};
pub use resolver::{DeepLinkResolver, LinkResolution, LinkedFile};
pub use signer::{verify_signature, wallet_address, Ed25519Wallet, RevisionSigner, SignatureCheck};
pub use witness::{InMemoryWitnessLedger, WitnessConfirmation, WitnessConfirmer};
