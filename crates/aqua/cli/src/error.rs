//! CLI error types

use aqua_chain::{ChainError, ResolveError};
use aqua_types::TreeError;
use aqua_verify::VerifyError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("Link error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
