//! Registry configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! [index]
//! initial_capacity = 64
//! conflict = "merge"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors loading a [`RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read registry config: {0}")]
	Read(#[from] std::io::Error),
	#[error("failed to parse registry config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// What the registry does when a contributor registers again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
	/// Append the new children to the existing record.
	#[default]
	Merge,
	/// Drop the existing record in favour of the new one.
	Replace,
}

/// Settings for the contribution index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
	/// Expected number of contributors.
	pub initial_capacity: usize,
	pub conflict: ConflictPolicy,
}

impl Default for IndexConfig {
	fn default() -> Self {
		Self {
			initial_capacity: 64,
			conflict: ConflictPolicy::Merge,
		}
	}
}

/// Top-level registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	pub index: IndexConfig,
}

impl RegistryConfig {
	/// Parses a configuration from TOML text.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)?;
		let config = Self::from_toml(&text)?;
		tracing::debug!(path = %path.display(), ?config, "loaded registry config");
		Ok(config)
	}
}
