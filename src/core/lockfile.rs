//! `kcl.mod.lock` encoding and decoding.
//!
//! The lock file is generated after resolution and rewritten wholesale on
//! every successful resolve. Each record carries `name`, `full_name`,
//! `version`, `sum` and the source keys; encoding is deterministic so that
//! unchanged state produces byte-identical files.

use std::path::Path;

use toml_edit::{DocumentMut, Item};

use crate::core::dependencies::DependencyTable;
use crate::core::dependency::{Dependency, RecordStyle};
use crate::core::errors::{ManifestError, Result};
use crate::util::fs;

const HEADER: &str = "# This file is automatically generated by kpm.\n\
                      # It is not intended for manual editing.\n\n";

/// The locked dependency set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFile {
    /// Locked dependencies; every entry carries a checksum
    pub dependencies: DependencyTable,
}

impl LockFile {
    pub fn new(dependencies: DependencyTable) -> Self {
        LockFile { dependencies }
    }

    /// Encode as `kcl.mod.lock` text.
    ///
    /// Fails with `MissingChecksum` if any entry has an empty or absent `sum`.
    pub fn encode(&self) -> Result<String> {
        if let Some((key, _)) = self.dependencies.iter().find(|(_, dep)| !dep.has_sum()) {
            return Err(ManifestError::MissingChecksum { key: key.clone() });
        }

        let mut doc = DocumentMut::new();
        doc.insert(
            "dependencies",
            Item::Table(self.dependencies.to_toml_table(RecordStyle::Lock)),
        );
        Ok(format!("{HEADER}{doc}"))
    }

    /// Parse `kcl.mod.lock` text.
    pub fn decode(content: &str) -> Result<Self> {
        let doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| ManifestError::malformed(e.to_string()))?;

        let mut dependencies = DependencyTable::new();
        let Some(item) = doc.get("dependencies") else {
            return Ok(LockFile::new(dependencies));
        };
        let table = item
            .as_table_like()
            .ok_or_else(|| ManifestError::malformed("`dependencies` must be a table"))?;

        for (key, item) in table.iter() {
            let record = item.as_table_like().ok_or_else(|| {
                ManifestError::malformed(format!("locked dependency `{}` must be a table", key))
            })?;
            let dep = Dependency::from_table_fragment(record, key)?;
            if !dep.has_sum() {
                return Err(ManifestError::MissingChecksum {
                    key: key.to_string(),
                });
            }
            dependencies.insert(key, dep);
        }

        Ok(LockFile::new(dependencies))
    }

    /// Load a lock file from a path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let lock = Self::decode(&content).map_err(|e| e.with_path(path))?;
        tracing::debug!(
            "loaded {} locked dependencies from {}",
            lock.dependencies.len(),
            path.display()
        );
        Ok(lock)
    }

    /// Save the lock file to a path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.encode()?;
        fs::write_string(path, &content)?;
        tracing::debug!("saved lock file to {}", path.display());
        Ok(())
    }

    /// Keys of `declared` dependencies that have no locked entry.
    pub fn unlocked<'a>(&self, declared: &'a DependencyTable) -> Vec<&'a str> {
        declared
            .keys()
            .filter(|key| !self.dependencies.contains_key(key))
            .map(String::as_str)
            .collect()
    }
}
