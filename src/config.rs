//! Declared-state loading
//!
//! A resource file is a list of entries, each declaring exactly one of
//! `file`, `package` or `service`. JSON files hold a top-level array;
//! TOML files hold `[[resources]]` tables.

use anyhow::{Context, Result};
use declarative::{ResourceEntry, ResourceMap};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Supported resource file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Pick the format from the file extension (JSON unless `.toml`)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlDocument {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
}

/// Load and validate the resources declared in `path`
pub fn load(path: &Path) -> Result<ResourceMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    let entries = parse(Format::from_path(path), &content)
        .with_context(|| format!("Could not parse config file {}", path.display()))?;
    log::debug!("Loaded {} entries from {}", entries.len(), path.display());

    ResourceMap::from_entries(entries)
        .with_context(|| format!("Invalid resources in {}", path.display()))
}

/// Parse resource entries without validating them
pub fn parse(format: Format, content: &str) -> Result<Vec<ResourceEntry>> {
    match format {
        Format::Json => serde_json::from_str(content).context("Invalid JSON resource list"),
        Format::Toml => {
            let document: TomlDocument =
                toml::from_str(content).context("Invalid TOML resource list")?;
            Ok(document.resources)
        }
    }
}
