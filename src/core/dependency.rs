//! Dependency entries.
//!
//! A [`Dependency`] is one package's declared (manifest) or locked
//! (lock file) metadata. On disk it is a single flat record: identity keys
//! followed by the source keys of [`DependencySource`].

use std::fmt;

use toml_edit::{value, Item, Table, TableLike};

use crate::core::errors::{ManifestError, Result};
use crate::core::oci::OciSource;
use crate::core::source::{is_source_key, string_field, DependencySource};

/// Identity keys of a dependency record, in the order they are written.
const IDENTITY_KEYS: [&str; 4] = ["name", "full_name", "version", "sum"];

/// Which file a record is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStyle {
    /// `kcl.mod`: no checksum, redundant identity keys left out.
    Manifest,
    /// `kcl.mod.lock`: every identity key written.
    Lock,
}

/// A single dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Logical package name
    pub name: String,

    /// Storage identifier, usually `name_version`. Stored verbatim: older
    /// lock files may carry values that no longer match [`Self::derived_full_name`].
    pub full_name: String,

    /// Version (may be empty for tag-pinned sources)
    pub version: String,

    /// Content checksum; only present in lock files
    pub sum: Option<String>,

    /// Where the content comes from
    pub source: DependencySource,
}

/// Compute `name_version`, falling back to `name_tag`, then `name`.
pub fn derive_full_name(name: &str, version: &str, source: &DependencySource) -> String {
    if !version.is_empty() {
        format!("{}_{}", name, version)
    } else if let Some(tag) = source.tag() {
        format!("{}_{}", name, tag)
    } else {
        name.to_string()
    }
}

impl Dependency {
    /// Create a dependency, deriving its full name.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<DependencySource>,
    ) -> Self {
        let name = name.into();
        let version = version.into();
        let source = source.into();
        let full_name = derive_full_name(&name, &version, &source);
        Dependency {
            name,
            full_name,
            version,
            sum: None,
            source,
        }
    }

    /// Set the checksum.
    pub fn with_sum(mut self, sum: impl Into<String>) -> Self {
        self.sum = Some(sum.into());
        self
    }

    /// Override the stored full name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// The full name recomputed from `name`, `version` and the source tag.
    pub fn derived_full_name(&self) -> String {
        derive_full_name(&self.name, &self.version, &self.source)
    }

    /// Whether a non-empty checksum is recorded.
    pub fn has_sum(&self) -> bool {
        self.sum.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// OCI coordinates with empty fields filled from configuration.
    pub fn resolved_oci(&self, config: &crate::util::config::OciConfig) -> Option<OciSource> {
        self.source
            .as_oci()
            .map(|oci| oci.with_defaults(&self.name, &self.version, config))
    }

    /// Flatten into a single record for the table entry `key`.
    pub fn to_table_fragment(&self, key: &str, style: RecordStyle) -> Table {
        let mut record = Table::new();

        match style {
            RecordStyle::Manifest => {
                if self.name != key {
                    record.insert("name", value(&self.name));
                }
                if self.full_name != self.derived_full_name() {
                    record.insert("full_name", value(&self.full_name));
                }
                if !self.version.is_empty() {
                    record.insert("version", value(&self.version));
                }
            }
            RecordStyle::Lock => {
                record.insert("name", value(&self.name));
                record.insert("full_name", value(&self.full_name));
                record.insert("version", value(&self.version));
                record.insert("sum", value(self.sum.as_deref().unwrap_or_default()));
            }
        }

        self.source.encode_into(&mut record);
        record
    }

    /// Rebuild a dependency from the record stored under `key`.
    ///
    /// `name` defaults to `key` and `full_name` to the derived value; the
    /// source must be recognizable from the record's keys.
    pub fn from_table_fragment(fragment: &dyn TableLike, key: &str) -> Result<Self> {
        for (field, _) in fragment.iter() {
            if !IDENTITY_KEYS.contains(&field) && !is_source_key(field) {
                tracing::debug!("dependency `{}`: ignoring unknown key `{}`", key, field);
            }
        }

        let source = DependencySource::decode(fragment, key)?;
        let name = string_field(fragment, "name", key)?.unwrap_or_else(|| key.to_string());
        let version = string_field(fragment, "version", key)?.unwrap_or_default();
        let sum = string_field(fragment, "sum", key)?;
        let derived = derive_full_name(&name, &version, &source);

        let full_name = match string_field(fragment, "full_name", key)? {
            Some(stored) => {
                if stored != derived {
                    tracing::debug!(
                        "dependency `{}`: stored full name `{}` differs from `{}`",
                        key,
                        stored,
                        derived
                    );
                }
                stored
            }
            None => derived,
        };

        Ok(Dependency {
            name,
            full_name,
            version,
            sum,
            source,
        })
    }

    /// Decode one of the hand-written manifest forms:
    ///
    /// - `dep = "0.0.1"`: default-registry OCI dependency at that version
    /// - `dep = { git = "...", tag = "v1" }`: inline record; a missing
    ///   `version` is taken from the source tag
    /// - `[dependencies.dep]`: exact record, see [`Self::from_table_fragment`]
    ///
    /// Manifests carry no checksums; a `sum` key is dropped.
    pub fn from_manifest_item(item: &Item, key: &str) -> Result<Self> {
        let mut dep = Self::decode_manifest_item(item, key)?;
        if dep.sum.take().is_some() {
            tracing::debug!("dependency `{}`: dropping `sum` from manifest record", key);
        }
        Ok(dep)
    }

    fn decode_manifest_item(item: &Item, key: &str) -> Result<Self> {
        if let Some(version) = item.as_str() {
            return Ok(Dependency::new(key, version, OciSource::from_tag(version)));
        }

        if let Some(inline) = item.as_inline_table() {
            let mut dep = Dependency::from_table_fragment(inline, key)?;
            if dep.version.is_empty() {
                if let Some(tag) = dep.source.tag() {
                    dep.version = tag.to_string();
                }
            }
            return Ok(dep);
        }

        match item.as_table_like() {
            Some(record) => Dependency::from_table_fragment(record, key),
            None => Err(ManifestError::malformed(format!(
                "dependency `{}` must be a version string or a table",
                key
            ))),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.version.is_empty() {
            write!(f, " {}", self.version)?;
        }
        write!(f, " ({})", self.source.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::source::record;
    use crate::util::config::OciConfig;

    fn git_dep() -> Dependency {
        Dependency::new(
            "MyKcl1",
            "",
            DependencySource::git_tag("https://github.com/test/MyKcl1.git", "v0.0.2"),
        )
    }

    #[test]
    fn test_full_name_derivation() {
        assert_eq!(git_dep().full_name, "MyKcl1_v0.0.2");

        let oci = Dependency::new("k8s", "1.28", OciSource::from_tag("1.28"));
        assert_eq!(oci.full_name, "k8s_1.28");

        let local = Dependency::new("helper", "", DependencySource::local("../helper"));
        assert_eq!(local.full_name, "helper");
    }

    #[test]
    fn test_missing_full_name_is_derived() {
        let fragment = record(&[
            ("version", "v0.0.2"),
            ("url", "https://github.com/test/MyKcl1.git"),
            ("tag", "v0.0.2"),
        ]);
        let dep = Dependency::from_table_fragment(&fragment, "MyKcl1").unwrap();
        assert_eq!(dep.name, "MyKcl1");
        assert_eq!(dep.full_name, "MyKcl1_v0.0.2");
        assert_eq!(dep.sum, None);
    }

    #[test]
    fn test_stored_full_name_is_kept() {
        let fragment = record(&[
            ("full_name", "legacy-MyKcl1-0.0.2"),
            ("version", "v0.0.2"),
            ("path", "../MyKcl1"),
        ]);
        let dep = Dependency::from_table_fragment(&fragment, "MyKcl1").unwrap();
        assert_eq!(dep.full_name, "legacy-MyKcl1-0.0.2");
        assert_eq!(dep.derived_full_name(), "MyKcl1_v0.0.2");
    }

    #[test]
    fn test_manifest_fragment_omits_redundant_keys() {
        let dep = git_dep().with_sum("abc");
        let fragment = dep.to_table_fragment("MyKcl1", RecordStyle::Manifest);
        let keys: Vec<&str> = fragment.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["url", "tag"]);

        let renamed = dep.to_table_fragment("alias", RecordStyle::Manifest);
        assert_eq!(renamed.get("name").and_then(Item::as_str), Some("MyKcl1"));
    }

    #[test]
    fn test_lock_fragment_key_order() {
        let dep = Dependency::new("MyOciKcl1", "0.0.1", OciSource::new("test_reg", "test_repo", "0.0.1"))
            .with_sum("hjkasdahjksdasdhjk");
        let fragment = dep.to_table_fragment("MyOciKcl1", RecordStyle::Lock);
        let keys: Vec<&str> = fragment.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["name", "full_name", "version", "sum", "reg", "repo", "tag"]
        );

        let decoded = Dependency::from_table_fragment(&fragment, "MyOciKcl1").unwrap();
        assert_eq!(decoded, dep);
    }

    #[test]
    fn test_version_string_shorthand() {
        let item = value("0.0.1");
        let dep = Dependency::from_manifest_item(&item, "MyOciKcl1").unwrap();
        assert_eq!(dep.version, "0.0.1");
        assert_eq!(dep.full_name, "MyOciKcl1_0.0.1");
        assert_eq!(dep.source, DependencySource::Oci(OciSource::from_tag("0.0.1")));
    }

    #[test]
    fn test_inline_table_infers_version_from_tag() {
        let doc: toml_edit::DocumentMut =
            r#"dep = { oci = "oci://ghcr.io/test/helloworld", tag = "0.0.1" }"#
                .parse()
                .unwrap();
        let dep = Dependency::from_manifest_item(&doc["dep"], "dep").unwrap();
        assert_eq!(dep.version, "0.0.1");
        assert_eq!(dep.full_name, "dep_0.0.1");
        assert_eq!(
            dep.source,
            DependencySource::oci("ghcr.io", "test/helloworld", "0.0.1")
        );
    }

    #[test]
    fn test_manifest_item_drops_sum() {
        let doc: toml_edit::DocumentMut = r#"
[k]
version = "0.0.1"
sum = "abc"
tag = "0.0.1"

[inline]
dep = { path = "../dep", sum = "abc" }
"#
        .parse()
        .unwrap();
        let section = Dependency::from_manifest_item(&doc["k"], "k").unwrap();
        assert_eq!(section.sum, None);
        assert_eq!(section.version, "0.0.1");

        let inline = Dependency::from_manifest_item(&doc["inline"]["dep"], "dep").unwrap();
        assert_eq!(inline.sum, None);
        assert_eq!(inline.source, DependencySource::local("../dep"));

        let locked = Dependency::from_table_fragment(doc["k"].as_table().unwrap(), "k").unwrap();
        assert_eq!(locked.sum.as_deref(), Some("abc"));
    }

    #[test]
    fn test_non_table_item_is_malformed() {
        let err = Dependency::from_manifest_item(&value(true), "dep").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_resolved_oci_uses_defaults() {
        let dep = Dependency::new("k8s", "1.28", OciSource::from_tag(""));
        let resolved = dep.resolved_oci(&OciConfig::default()).unwrap();
        assert_eq!(
            resolved.to_canonical_url().as_deref(),
            Some("ghcr.io/kcl-lang/k8s:1.28")
        );
        assert!(git_dep().resolved_oci(&OciConfig::default()).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(git_dep().to_string(), "MyKcl1 (git)");
        let dep = Dependency::new("k8s", "1.28", OciSource::from_tag("1.28"));
        assert_eq!(dep.to_string(), "k8s 1.28 (oci)");
    }
}
