//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.kpm/config.toml` - user-wide defaults
//! - Project: `.kpm/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. A missing or broken
//! file falls back to defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::manifest::UnknownKeyPolicy;

/// Registry used when a dependency names no registry.
pub const DEFAULT_OCI_REGISTRY: &str = "ghcr.io";

/// Repository namespace used when a dependency names no repository.
pub const DEFAULT_OCI_REPO_PREFIX: &str = "kcl-lang";

/// kpm configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OCI registry defaults
    pub oci: OciConfig,

    /// Manifest parsing settings
    pub manifest: ManifestConfig,
}

/// OCI registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OciConfig {
    /// Registry host, e.g. `ghcr.io` or `localhost:5001`
    pub default_registry: Option<String>,

    /// Repository namespace, e.g. `kcl-lang`
    pub default_repo_prefix: Option<String>,
}

impl OciConfig {
    pub fn registry(&self) -> &str {
        self.default_registry.as_deref().unwrap_or(DEFAULT_OCI_REGISTRY)
    }

    pub fn repo_prefix(&self) -> &str {
        self.default_repo_prefix
            .as_deref()
            .unwrap_or(DEFAULT_OCI_REPO_PREFIX)
    }
}

/// Manifest parsing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// What to do with unknown top-level keys in `kcl.mod`
    pub unknown_keys: Option<UnknownKeyPolicy>,
}

impl ManifestConfig {
    pub fn unknown_key_policy(&self) -> UnknownKeyPolicy {
        self.unknown_keys.unwrap_or_default()
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.oci.default_registry.is_some() {
            self.oci.default_registry = other.oci.default_registry;
        }
        if other.oci.default_repo_prefix.is_some() {
            self.oci.default_repo_prefix = other.oci.default_repo_prefix;
        }
        if other.manifest.unknown_keys.is_some() {
            self.manifest.unknown_keys = other.manifest.unknown_keys;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.kpm/config.toml)
/// 2. Global config (~/.kpm/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global kpm config directory (~/.kpm).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".kpm"))
}

/// Get the global config path (~/.kpm/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.kpm/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".kpm").join("config.toml")
}

/// Configuration for a package rooted at `project_root`.
pub fn config_for(project_root: &Path) -> Config {
    load_config(
        global_config_path().as_deref(),
        &project_config_path(project_root),
    )
}
