//! Identifier-type configuration loading.
//!
//! Deployments define their identifier types in a YAML or JSON file that is
//! resolved once at startup and passed into whatever needs it, rather than
//! re-read during validation. Deserialisation is strict: unknown keys are
//! rejected so typos in a type definition fail loudly.

use std::path::Path;

use pim_types::PatientIdentifierType;
use serde::Deserialize;

/// Errors raised while loading identifier-type definitions.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read identifier type definitions: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse YAML identifier type definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON identifier type definitions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported identifier type definitions extension: \"{0}\" (expected yaml, yml or json)")]
    UnsupportedExtension(String),
}

/// The set of identifier types a deployment knows about.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifierTypeSet {
    pub types: Vec<PatientIdentifierType>,
}

impl IdentifierTypeSet {
    /// Parse definitions from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse definitions from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load definitions from a file, choosing the parser by extension.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text),
            "json" => Self::from_json(&text),
            other => Err(ConfigError::UnsupportedExtension(other.to_owned())),
        }
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&PatientIdentifierType> {
        self.types.iter().find(|t| t.name == name)
    }
}
