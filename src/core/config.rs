//! Toolkit configuration

use std::path::Path;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading the configuration file
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Minting endpoint settings.
///
/// Absent (or an empty endpoint) is the valid "minting disabled" state:
/// exports proceed without assigning identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct MinterConfig {
    /// Minting service URL
    pub endpoint: String,

    /// Identifier shoulder/prefix requested from the service
    #[serde(default)]
    pub prefix: String,

    /// Value sent in the `api-key` request header
    #[serde(default)]
    pub api_key: String,
}

/// Toolkit configuration, deserialized from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to fetch the metadata field map from
    pub fieldmap_url: Option<String>,

    /// Where to fetch the controlled vocabulary from; empty or absent means
    /// no vocabulary constraints
    pub vocabulary_url: Option<String>,

    /// Minting endpoint settings
    pub minter: Option<MinterConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The minter settings, if minting is actually configured
    pub fn minter(&self) -> Option<&MinterConfig> {
        self.minter.as_ref().filter(|m| !m.endpoint.is_empty())
    }
}
