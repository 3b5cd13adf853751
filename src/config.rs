//! Engine configuration, loaded from an optional JSON file.
//!
//! Every field has a default, so an empty object (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::codegen::{Framework, GenerateOptions};
use crate::validation::{ValidationPolicy, Validator};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default)]
    pub policy: ValidationPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenConfig {
    #[serde(default)]
    pub framework: Framework,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
}

impl CoreConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validator(&self) -> Validator {
        Validator::with_policy(self.validation.policy)
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::new(self.codegen.framework)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.validator().policy(), ValidationPolicy::Lenient);
        assert_eq!(config.generate_options().framework, Framework::Next);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"validation": {{"policy": "strict"}}, "codegen": {{"framework": "react"}}}}"#).unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.validation.policy, ValidationPolicy::Strict);
        assert_eq!(config.codegen.framework, Framework::React);
    }

    #[test]
    fn test_unknown_framework_is_rejected() {
        let err = CoreConfig::from_json(r#"{"codegen": {"framework": "svelte"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = CoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
