//! Converter configuration (`rp.yml`)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};

/// Converter settings; every field has a default so an empty file is valid
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterConfig {
    /// Maximum plan nesting depth before conversion is refused
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Parse the generated SQL before returning it
    #[serde(default)]
    pub validate_output: bool,
}

fn default_max_depth() -> usize {
    256
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            validate_output: false,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConvertError::Config { message } => ConvertError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> ConvertResult<Self> {
        let config: ConverterConfig = if content.trim().is_empty() {
            ConverterConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConvertError::Config {
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConvertResult<()> {
        if self.max_depth == 0 {
            return Err(ConvertError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
