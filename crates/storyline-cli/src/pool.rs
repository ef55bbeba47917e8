//! Loading scenario pools and engine configuration from disk

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use storyline_compose::ComposeConfig;
use storyline_scenario::Scenario;

/// On-disk scenario pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFile {
    /// Scenarios, in source order
    pub scenarios: Vec<Scenario>,
}

impl PoolFile {
    /// Parse pool text; `json` selects JSON, YAML otherwise
    ///
    /// # Errors
    /// Returns an error if the text is not a valid pool document.
    pub fn parse(text: &str, json: bool) -> Result<Self> {
        if json {
            serde_json::from_str(text).context("invalid JSON scenario pool")
        } else {
            serde_yaml::from_str(text).context("invalid YAML scenario pool")
        }
    }
}

/// Read a pool from a `.yaml`, `.yml` or `.json` file
///
/// # Errors
/// Returns an error for unreadable files, unknown extensions or invalid content.
pub fn load_pool(path: &Path) -> Result<Vec<Scenario>> {
    let json = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => true,
        Some("yaml" | "yml") => false,
        _ => bail!("{}: expected a .yaml, .yml or .json file", path.display()),
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let pool = PoolFile::parse(&text, json).with_context(|| path.display().to_string())?;
    tracing::debug!(path = %path.display(), scenarios = pool.scenarios.len(), "scenario pool loaded");
    Ok(pool.scenarios)
}

/// Read engine configuration from a TOML file
///
/// # Errors
/// Returns an error for unreadable files or invalid settings.
pub fn load_config(path: &Path) -> Result<ComposeConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    ComposeConfig::from_toml_str(&text).with_context(|| path.display().to_string())
}
