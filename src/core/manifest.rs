//! `kcl.mod` manifest parsing and encoding.
//!
//! The manifest is the human-edited package descriptor:
//!
//! ```toml
//! [package]
//! name = "MyKcl"
//! edition = "v0.0.1"
//! version = "v0.0.1"
//!
//! [dependencies]
//!
//! [dependencies.MyKcl1]
//! url = "https://github.com/test/MyKcl1.git"
//! tag = "v0.0.2"
//!
//! [profile]
//! entries = ["main.k"]
//! ```
//!
//! Decoding also accepts the shorthand forms `dep = "0.0.1"` and
//! `dep = { git = "...", tag = "..." }`; encoding always writes one
//! section per dependency, in table order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toml_edit::{value, Array, DocumentMut, Item, Table, TableLike};

use crate::core::dependencies::DependencyTable;
use crate::core::dependency::{Dependency, RecordStyle};
use crate::core::errors::{ManifestError, Result};
use crate::util::fs;

/// Edition written into freshly created packages.
pub const DEFAULT_EDITION: &str = "v0.5.0";

/// Version written into freshly created packages.
pub const DEFAULT_VERSION: &str = "0.0.1";

const KNOWN_TOP_LEVEL_KEYS: [&str; 4] = ["package", "dependencies", "profile", "profiles"];

/// How to treat unknown top-level manifest keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Skip them (tolerates fields added by newer tools)
    #[default]
    Ignore,
    /// Skip them with a warning
    Warn,
    /// Fail with `MalformedManifest`
    Reject,
}

/// The parsed `kcl.mod` manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Package metadata from [package]
    pub package: PackageMetadata,

    /// Declared dependencies, in file order
    pub dependencies: DependencyTable,

    /// Compilation entries from [profile]
    pub profile: Option<Profile>,
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Language edition the package targets
    pub edition: String,

    /// Package version
    pub version: String,

    /// Free-form description
    pub description: Option<String>,

    /// Patterns of files to package (empty means everything)
    pub include: Vec<String>,

    /// Patterns of files never packaged
    pub exclude: Vec<String>,
}

/// The [profile] section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Entry files or directories to compile, in order
    pub entries: Vec<String>,
}

impl Manifest {
    /// Create the manifest of a new package with no dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Manifest {
            package: PackageMetadata {
                name: name.into(),
                edition: DEFAULT_EDITION.to_string(),
                version: DEFAULT_VERSION.to_string(),
                ..Default::default()
            },
            dependencies: DependencyTable::new(),
            profile: None,
        }
    }

    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, UnknownKeyPolicy::default())
    }

    /// Load a manifest with an explicit unknown-key policy.
    pub fn load_with(path: &Path, policy: UnknownKeyPolicy) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let manifest = Self::decode_with(&content, policy).map_err(|e| e.with_path(path))?;
        tracing::debug!(
            "loaded manifest for `{}` with {} dependencies from {}",
            manifest.package.name,
            manifest.dependencies.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Write the canonical encoding to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write_string(path, &self.encode())?;
        tracing::debug!("saved manifest to {}", path.display());
        Ok(())
    }

    /// Parse manifest text, ignoring unknown top-level keys.
    pub fn decode(content: &str) -> Result<Self> {
        Self::decode_with(content, UnknownKeyPolicy::default())
    }

    /// Parse manifest text.
    pub fn decode_with(content: &str, policy: UnknownKeyPolicy) -> Result<Self> {
        let doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| ManifestError::malformed(e.to_string()))?;

        for (key, _) in doc.iter() {
            if KNOWN_TOP_LEVEL_KEYS.contains(&key) {
                continue;
            }
            match policy {
                UnknownKeyPolicy::Ignore => {
                    tracing::debug!("ignoring unknown manifest key `{}`", key)
                }
                UnknownKeyPolicy::Warn => tracing::warn!("ignoring unknown manifest key `{}`", key),
                UnknownKeyPolicy::Reject => {
                    return Err(ManifestError::malformed(format!(
                        "unknown top-level key `{}`",
                        key
                    )))
                }
            }
        }

        let package = match doc.get("package").and_then(Item::as_table_like) {
            Some(table) => PackageMetadata::decode(table)?,
            None => return Err(ManifestError::malformed("missing [package] section")),
        };

        let mut dependencies = DependencyTable::new();
        if let Some(item) = doc.get("dependencies") {
            let table = item
                .as_table_like()
                .ok_or_else(|| ManifestError::malformed("`dependencies` must be a table"))?;
            for (key, item) in table.iter() {
                dependencies.insert(key, Dependency::from_manifest_item(item, key)?);
            }
        }

        let profile = match (doc.get("profile"), doc.get("profiles")) {
            (Some(_), Some(_)) => {
                return Err(ManifestError::malformed(
                    "both [profile] and [profiles] are present",
                ))
            }
            (Some(item), None) | (None, Some(item)) => Some(Profile::decode(item)?),
            (None, None) => None,
        };

        Ok(Manifest {
            package,
            dependencies,
            profile,
        })
    }

    /// Encode as `kcl.mod` text. Checksums are never written.
    pub fn encode(&self) -> String {
        let mut doc = DocumentMut::new();
        doc.insert("package", Item::Table(self.package.encode()));
        doc.insert(
            "dependencies",
            Item::Table(self.dependencies.to_toml_table(RecordStyle::Manifest)),
        );
        if let Some(profile) = &self.profile {
            let mut table = Table::new();
            table.insert("entries", value(string_array(&profile.entries)));
            doc.insert("profile", Item::Table(table));
        }
        doc.to_string()
    }

    /// Add or replace a dependency under `key`.
    pub fn add_dependency(&mut self, key: impl Into<String>, dep: Dependency) -> Option<Dependency> {
        let key = key.into();
        tracing::debug!("adding dependency `{}` as {}", key, dep);
        self.dependencies.insert(key, dep)
    }

    /// Remove the dependency stored under `key`.
    pub fn remove_dependency(&mut self, key: &str) -> Option<Dependency> {
        self.dependencies.remove(key)
    }

    /// Get a dependency by table key.
    pub fn dependency(&self, key: &str) -> Option<&Dependency> {
        self.dependencies.get(key)
    }

    /// Profile entries, if a [profile] section is present.
    pub fn entries(&self) -> Option<&[String]> {
        self.profile.as_ref().map(|p| p.entries.as_slice())
    }
}

impl PackageMetadata {
    fn decode(table: &dyn TableLike) -> Result<Self> {
        let required = |field: &str| -> Result<String> {
            package_string(table, field)?
                .ok_or_else(|| ManifestError::malformed(format!("missing `package.{}`", field)))
        };

        Ok(PackageMetadata {
            name: required("name")?,
            version: required("version")?,
            edition: package_string(table, "edition")?.unwrap_or_default(),
            description: package_string(table, "description")?,
            include: string_list(table, "include")?,
            exclude: string_list(table, "exclude")?,
        })
    }

    fn encode(&self) -> Table {
        let mut table = Table::new();
        table.insert("name", value(&self.name));
        if !self.edition.is_empty() {
            table.insert("edition", value(&self.edition));
        }
        table.insert("version", value(&self.version));
        if let Some(description) = &self.description {
            table.insert("description", value(description));
        }
        if !self.include.is_empty() {
            table.insert("include", value(string_array(&self.include)));
        }
        if !self.exclude.is_empty() {
            table.insert("exclude", value(string_array(&self.exclude)));
        }
        table
    }
}

impl Profile {
    fn decode(item: &Item) -> Result<Self> {
        let table = item
            .as_table_like()
            .ok_or_else(|| ManifestError::malformed("`profile` must be a table"))?;
        Ok(Profile {
            entries: string_list(table, "entries")?,
        })
    }
}

fn package_string(table: &dyn TableLike, field: &str) -> Result<Option<String>> {
    match table.get(field) {
        None => Ok(None),
        Some(item) => item
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ManifestError::malformed(format!("`{}` must be a string", field))),
    }
}

fn string_list(table: &dyn TableLike, field: &str) -> Result<Vec<String>> {
    let Some(item) = table.get(field) else {
        return Ok(Vec::new());
    };
    let not_strings = || ManifestError::malformed(format!("`{}` must be an array of strings", field));
    item.as_array()
        .ok_or_else(not_strings)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(not_strings))
        .collect()
}

fn string_array(items: &[String]) -> Array {
    items.iter().map(String::as_str).collect()
}
