//! Dependency sources - WHERE a dependency's content comes from.
//!
//! In `kcl.mod` and `kcl.mod.lock` a source has no type tag. Its fields are
//! flattened into the dependency record next to `name`/`version`/`sum`, and
//! the variant is recovered from which keys are present:
//!
//! | kind  | keys                                                   |
//! |-------|--------------------------------------------------------|
//! | local | `path`                                                 |
//! | git   | `url` (or `git`), `branch`, `commit`, `tag` (or `git_tag`) |
//! | oci   | `reg`, `repo`, `oci`, `tag` (or `oci_tag`)             |
//!
//! A bare `tag` belongs to the OCI group; next to `url` it is a git tag.

use std::fmt;
use std::path::PathBuf;

use toml_edit::{value, Table, TableLike};

use crate::core::errors::{ManifestError, Result};
use crate::core::oci::OciSource;

/// A local filesystem dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalSource {
    pub path: PathBuf,
}

/// A git dependency. At most one of `tag`/`branch`/`commit` is expected,
/// but all three are carried if present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GitSource {
    pub url: String,
    pub tag: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

/// Where a dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencySource {
    Local(LocalSource),
    Git(GitSource),
    Oci(OciSource),
}

/// The source variant, independent of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Local,
    Git,
    Oci,
}

impl SourceKind {
    const ALL: [SourceKind; 3] = [SourceKind::Local, SourceKind::Git, SourceKind::Oci];

    /// Record keys that select this kind on their own.
    fn anchor_keys(self) -> &'static [&'static str] {
        match self {
            SourceKind::Local => &["path"],
            SourceKind::Git => &["url", "git", "branch", "commit", "git_tag"],
            SourceKind::Oci => &["reg", "repo", "oci", "oci_tag"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Git => "git",
            SourceKind::Oci => "oci",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key shared by the git and OCI groups.
const TAG_KEY: &str = "tag";

/// Every key a source may occupy in a flat record.
pub(crate) fn is_source_key(key: &str) -> bool {
    key == TAG_KEY
        || SourceKind::ALL
            .iter()
            .any(|kind| kind.anchor_keys().contains(&key))
}

/// Read an optional string field from a record.
pub(crate) fn string_field(
    fragment: &dyn TableLike,
    field: &str,
    key: &str,
) -> Result<Option<String>> {
    match fragment.get(field) {
        None => Ok(None),
        Some(item) => match item.as_str() {
            Some(s) => Ok(Some(s.to_string())),
            None => Err(ManifestError::malformed(format!(
                "dependency `{}`: `{}` must be a string",
                key, field
            ))),
        },
    }
}

/// Read a field that may be spelled two ways; both spellings at once is an error.
fn aliased_field(
    fragment: &dyn TableLike,
    field: &str,
    alias: &str,
    key: &str,
) -> Result<Option<String>> {
    let primary = string_field(fragment, field, key)?;
    let secondary = string_field(fragment, alias, key)?;
    match (primary, secondary) {
        (Some(_), Some(_)) => Err(ManifestError::unknown_source(
            key,
            format!("both `{}` and `{}` are set", field, alias),
        )),
        (primary, secondary) => Ok(primary.or(secondary)),
    }
}

impl DependencySource {
    /// Create a local path source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        DependencySource::Local(LocalSource { path: path.into() })
    }

    /// Create a git source pinned to a tag.
    pub fn git_tag(url: impl Into<String>, tag: impl Into<String>) -> Self {
        DependencySource::Git(GitSource {
            url: url.into(),
            tag: Some(tag.into()),
            ..Default::default()
        })
    }

    /// Create an OCI source from discrete coordinates.
    pub fn oci(reg: impl Into<String>, repo: impl Into<String>, tag: impl Into<String>) -> Self {
        DependencySource::Oci(OciSource::new(reg, repo, tag))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DependencySource::Local(_) => SourceKind::Local,
            DependencySource::Git(_) => SourceKind::Git,
            DependencySource::Oci(_) => SourceKind::Oci,
        }
    }

    /// The tag the source is pinned to, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            DependencySource::Local(_) => None,
            DependencySource::Git(git) => git.tag.as_deref(),
            DependencySource::Oci(oci) if !oci.tag.is_empty() => Some(&oci.tag),
            DependencySource::Oci(_) => None,
        }
    }

    pub fn as_oci(&self) -> Option<&OciSource> {
        match self {
            DependencySource::Oci(oci) => Some(oci),
            _ => None,
        }
    }

    pub fn as_git(&self) -> Option<&GitSource> {
        match self {
            DependencySource::Git(git) => Some(git),
            _ => None,
        }
    }

    /// The canonical `reg/repo:tag` URL of an OCI source whose registry
    /// and repository are known.
    pub fn to_canonical_url(&self) -> Option<String> {
        self.as_oci().and_then(OciSource::to_canonical_url)
    }

    /// Write the source's keys into a flat record.
    ///
    /// Each kind always writes its anchor (`path`, `url`, or `tag` for OCI)
    /// so that the kind survives decoding even when other fields are empty.
    pub fn encode_into(&self, record: &mut Table) {
        match self {
            DependencySource::Local(local) => {
                record.insert("path", value(local.path.to_string_lossy().as_ref()));
            }
            DependencySource::Git(git) => {
                record.insert("url", value(&git.url));
                for (field, v) in [
                    ("tag", &git.tag),
                    ("branch", &git.branch),
                    ("commit", &git.commit),
                ] {
                    if let Some(v) = v {
                        record.insert(field, value(v));
                    }
                }
            }
            DependencySource::Oci(oci) => {
                if !oci.reg.is_empty() {
                    record.insert("reg", value(&oci.reg));
                }
                if !oci.repo.is_empty() {
                    record.insert("repo", value(&oci.repo));
                }
                record.insert(TAG_KEY, value(&oci.tag));
            }
        }
    }

    /// Encode the source alone as a record.
    pub fn encode(&self) -> Table {
        let mut record = Table::new();
        self.encode_into(&mut record);
        record
    }

    /// Recover a source from the keys present in a flat record.
    ///
    /// `key` names the dependency for error messages.
    pub fn decode(fragment: &dyn TableLike, key: &str) -> Result<Self> {
        let matched: Vec<(SourceKind, Vec<&str>)> = SourceKind::ALL
            .iter()
            .map(|&kind| {
                let present = kind
                    .anchor_keys()
                    .iter()
                    .copied()
                    .filter(|k| fragment.contains_key(k))
                    .collect::<Vec<_>>();
                (kind, present)
            })
            .filter(|(_, present)| !present.is_empty())
            .collect();
        let has_tag = fragment.contains_key(TAG_KEY);

        match matched.as_slice() {
            [] if has_tag => decode_oci(fragment, key),
            [] => Err(ManifestError::unknown_source(
                key,
                "expected `path`, `url`, or OCI coordinates (`reg`/`repo`/`tag`/`oci`)",
            )),
            [(SourceKind::Local, _)] if has_tag => Err(ManifestError::unknown_source(
                key,
                "`tag` cannot be combined with `path`",
            )),
            [(SourceKind::Local, _)] => {
                let path = string_field(fragment, "path", key)?.unwrap_or_default();
                Ok(DependencySource::local(path))
            }
            [(SourceKind::Git, _)] => decode_git(fragment, key),
            [(SourceKind::Oci, _)] => decode_oci(fragment, key),
            groups => {
                let keys = groups
                    .iter()
                    .flat_map(|(_, present)| present.iter().map(|k| format!("`{}`", k)))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ManifestError::unknown_source(
                    key,
                    format!("keys from more than one source kind: {}", keys),
                ))
            }
        }
    }
}

fn decode_git(fragment: &dyn TableLike, key: &str) -> Result<DependencySource> {
    let url = aliased_field(fragment, "url", "git", key)?.ok_or_else(|| {
        let given = SourceKind::Git
            .anchor_keys()
            .iter()
            .filter(|k| fragment.contains_key(k))
            .map(|k| format!("`{}`", k))
            .collect::<Vec<_>>()
            .join(", ");
        ManifestError::unknown_source(key, format!("{} given without a git `url`", given))
    })?;

    Ok(DependencySource::Git(GitSource {
        url,
        tag: aliased_field(fragment, TAG_KEY, "git_tag", key)?,
        branch: string_field(fragment, "branch", key)?,
        commit: string_field(fragment, "commit", key)?,
    }))
}

fn decode_oci(fragment: &dyn TableLike, key: &str) -> Result<DependencySource> {
    let tag = aliased_field(fragment, TAG_KEY, "oci_tag", key)?;

    if let Some(url) = string_field(fragment, "oci", key)? {
        if fragment.contains_key("reg") || fragment.contains_key("repo") {
            return Err(ManifestError::unknown_source(
                key,
                "`oci` cannot be combined with `reg`/`repo`",
            ));
        }
        let mut oci = OciSource::parse_url(&url)
            .map_err(|e| ManifestError::unknown_source(key, e.to_string()))?;
        if let Some(tag) = tag {
            if !oci.tag.is_empty() && oci.tag != tag {
                tracing::warn!(
                    "dependency `{}`: `tag = \"{}\"` overrides the tag in `{}`",
                    key,
                    tag,
                    url
                );
            }
            oci.tag = tag;
        }
        return Ok(DependencySource::Oci(oci));
    }

    Ok(DependencySource::Oci(OciSource {
        reg: string_field(fragment, "reg", key)?.unwrap_or_default(),
        repo: string_field(fragment, "repo", key)?.unwrap_or_default(),
        tag: tag.unwrap_or_default(),
    }))
}

impl From<OciSource> for DependencySource {
    fn from(oci: OciSource) -> Self {
        DependencySource::Oci(oci)
    }
}

impl From<GitSource> for DependencySource {
    fn from(git: GitSource) -> Self {
        DependencySource::Git(git)
    }
}

impl From<LocalSource> for DependencySource {
    fn from(local: LocalSource) -> Self {
        DependencySource::Local(local)
    }
}

/// Build a record from `key = "value"` pairs; used by tests across the crate.
#[cfg(test)]
pub(crate) fn record(pairs: &[(&str, &str)]) -> Table {
    let mut table = Table::new();
    for (k, v) in pairs {
        table.insert(k, toml_edit::Item::Value((*v).into()));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;

    fn decode(pairs: &[(&str, &str)]) -> Result<DependencySource> {
        DependencySource::decode(&record(pairs), "dep")
    }

    #[test]
    fn test_path_decodes_to_local() {
        let source = decode(&[("path", "../helper")]).unwrap();
        assert_eq!(source, DependencySource::local("../helper"));
    }

    #[test]
    fn test_url_and_tag_decode_to_git() {
        let source = decode(&[("url", "https://github.com/test/MyKcl1.git"), ("tag", "v0.0.2")])
            .unwrap();
        assert_eq!(
            source,
            DependencySource::git_tag("https://github.com/test/MyKcl1.git", "v0.0.2")
        );
    }

    #[test]
    fn test_git_aliases() {
        let source = decode(&[
            ("git", "https://github.com/test/MyKcl1.git"),
            ("branch", "main"),
        ])
        .unwrap();
        let git = source.as_git().unwrap();
        assert_eq!(git.url, "https://github.com/test/MyKcl1.git");
        assert_eq!(git.branch.as_deref(), Some("main"));
        assert_eq!(git.tag, None);

        let source = decode(&[("url", "https://x/y.git"), ("git_tag", "v1")]).unwrap();
        assert_eq!(source.tag(), Some("v1"));
    }

    #[test]
    fn test_reg_repo_tag_decode_to_oci() {
        let source = decode(&[("reg", "ghcr.io"), ("repo", "test/helloworld"), ("tag", "0.0.1")])
            .unwrap();
        assert_eq!(
            source,
            DependencySource::oci("ghcr.io", "test/helloworld", "0.0.1")
        );
    }

    #[test]
    fn test_bare_tag_decodes_to_oci() {
        let source = decode(&[("tag", "0.0.1")]).unwrap();
        assert_eq!(source, DependencySource::Oci(OciSource::from_tag("0.0.1")));
    }

    #[test]
    fn test_combined_oci_url() {
        let source = decode(&[("oci", "oci://localhost:5001/test/helloworld:0.0.1")]).unwrap();
        assert_eq!(
            source,
            DependencySource::oci("localhost:5001", "test/helloworld", "0.0.1")
        );

        let source = decode(&[("oci", "oci://ghcr.io/test/helloworld"), ("tag", "0.0.2")])
            .unwrap();
        assert_eq!(
            source.to_canonical_url().as_deref(),
            Some("ghcr.io/test/helloworld:0.0.2")
        );
    }

    #[test]
    fn test_keys_from_two_groups_are_rejected() {
        for pairs in [
            &[("path", "../a"), ("url", "https://x/y.git")][..],
            &[("url", "https://x/y.git"), ("reg", "ghcr.io")][..],
            &[("path", "../a"), ("tag", "v1")][..],
            &[("oci", "oci://ghcr.io/a/b"), ("repo", "a/b")][..],
            &[("reg", "ghcr.io"), ("branch", "main")][..],
        ] {
            let err = decode(pairs).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownSourceKind, "{:?}", pairs);
        }
    }

    #[test]
    fn test_no_group_is_rejected() {
        let err = decode(&[("version", "0.0.1")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSourceKind);

        let err = decode(&[("commit", "abc123")]).unwrap_err();
        assert!(err.to_string().contains("`commit` given without a git `url`"));

        let err = decode(&[("git_tag", "v1")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSourceKind);
        assert!(err.to_string().contains("`git_tag` given without a git `url`"));
        assert!(!err.to_string().contains("branch"));

        let err = decode(&[("branch", "main"), ("commit", "abc123")]).unwrap_err();
        assert!(err.to_string().contains("`branch`, `commit` given"));
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let mut fragment = record(&[("url", "https://x/y.git")]);
        fragment.insert("tag", value(3i64));
        let err = DependencySource::decode(&fragment, "dep").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_encode_then_decode_each_kind() {
        let sources = [
            DependencySource::local("../helper"),
            DependencySource::Git(GitSource {
                url: "https://github.com/kcl-lang/konfig".into(),
                commit: Some("8e14a7e".into()),
                ..Default::default()
            }),
            DependencySource::oci("", "", "0.0.1"),
            DependencySource::oci("localhost:5001", "test/helloworld", ""),
        ];
        for source in sources {
            let decoded = DependencySource::decode(&source.encode(), "dep").unwrap();
            assert_eq!(decoded, source);
        }
    }

    #[test]
    fn test_canonical_url_needs_registry_and_repo() {
        let short = DependencySource::Oci(OciSource::from_tag("0.1.0"));
        assert_eq!(short.to_canonical_url(), None);
        assert_eq!(DependencySource::local("../a").to_canonical_url(), None);
    }

    #[test]
    fn test_source_keys() {
        assert!(is_source_key("tag"));
        assert!(is_source_key("oci"));
        assert!(!is_source_key("sum"));
    }
}
