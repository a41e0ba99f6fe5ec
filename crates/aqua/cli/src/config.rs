//! CLI configuration

use crate::error::{CliError, CliResult};
use aqua_chain::ChainConfig;
use aqua_verify::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, read from TOML with `[chain]` and `[verifier]` sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    pub chain: ChainConfig,
    pub verifier: VerifierConfig,
}

impl CliConfig {
    /// Load configuration from file; a missing file yields defaults.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::parse(&contents)
        } else {
            Ok(CliConfig::default())
        }
    }

    pub fn parse(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("aqua").join("config.toml"))
    }
}
