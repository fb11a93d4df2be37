//! Project configuration file support for promptweave.
//!
//! Loads configuration from `promptweave.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Project-level configuration loaded from `promptweave.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Model endpoint base URL
    pub endpoint: Option<String>,
    /// Default model for every workflow step
    pub model: Option<String>,
    /// Refinement-loop role overrides
    #[serde(default)]
    pub refine: RefineRoles,
}

/// Per-role model configuration for the refinement loop
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RefineRoles {
    pub generator_model: Option<String>,
    pub evaluator_model: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "promptweave.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Effective generator model. Priority: [refine].generator_model > model
    pub fn generator_model(&self) -> Option<&str> {
        self.refine
            .generator_model
            .as_deref()
            .or(self.model.as_deref())
    }

    /// Effective evaluator model. Priority: [refine].evaluator_model > model
    pub fn evaluator_model(&self) -> Option<&str> {
        self.refine
            .evaluator_model
            .as_deref()
            .or(self.model.as_deref())
    }
}
