//! OCI registry coordinates and their canonical URL form.
//!
//! A registry dependency is addressed as `registry[:port]/repository:tag`.
//! Manifests may carry the coordinates as discrete `reg`/`repo`/`tag` keys
//! or as a single `oci = "oci://..."` string; both describe the same
//! [`OciSource`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::util::config::OciConfig;

/// URL scheme accepted in front of combined OCI references.
pub const OCI_SCHEME: &str = "oci://";

/// OCI registry coordinates. Any field may be empty; empty fields are
/// filled from [`OciConfig`] by [`OciSource::with_defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OciSource {
    /// Registry host, optionally with a port (`localhost:5001`)
    pub reg: String,
    /// Repository path inside the registry (`kcl-lang/k8s`)
    pub repo: String,
    /// Artifact tag
    pub tag: String,
}

/// A combined OCI reference that cannot be split into coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid OCI reference `{url}`: {reason}")]
pub struct InvalidOciUrl {
    pub url: String,
    pub reason: &'static str,
}

impl OciSource {
    /// Create coordinates from discrete fields.
    pub fn new(reg: impl Into<String>, repo: impl Into<String>, tag: impl Into<String>) -> Self {
        OciSource {
            reg: reg.into(),
            repo: repo.into(),
            tag: tag.into(),
        }
    }

    /// Coordinates with only a tag, resolved later against the default registry.
    pub fn from_tag(tag: impl Into<String>) -> Self {
        OciSource {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Split a combined reference such as `oci://ghcr.io/test/helloworld:0.0.1`.
    ///
    /// The first path segment is always the registry, so a port stays with
    /// the registry and only a `:` in the last segment introduces a tag.
    pub fn parse_url(url: &str) -> Result<Self, InvalidOciUrl> {
        let invalid = |reason| InvalidOciUrl {
            url: url.to_string(),
            reason,
        };

        let rest = url.trim().strip_prefix(OCI_SCHEME).unwrap_or(url.trim());
        let (reg, path) = rest
            .split_once('/')
            .ok_or_else(|| invalid("expected `registry/repository`"))?;
        if reg.is_empty() {
            return Err(invalid("registry is empty"));
        }

        let last_segment_start = path.rfind('/').map_or(0, |i| i + 1);
        let (repo, tag) = match path[last_segment_start..].rfind(':') {
            Some(i) => {
                let split = last_segment_start + i;
                (&path[..split], &path[split + 1..])
            }
            None => (path, ""),
        };
        let repo = repo.trim_end_matches('/');
        if repo.is_empty() {
            return Err(invalid("repository is empty"));
        }

        Ok(OciSource::new(reg, repo, tag))
    }

    /// Whether both the registry and the repository are known.
    pub fn is_complete(&self) -> bool {
        !self.reg.is_empty() && !self.repo.is_empty()
    }

    /// The canonical `reg/repo:tag` string for these coordinates.
    ///
    /// `None` until registry and repository are known; fill them with
    /// [`OciSource::with_defaults`] first. The tag is left out when empty,
    /// so the result always parses back with [`OciSource::parse_url`].
    pub fn to_canonical_url(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        let mut url = format!("{}/{}", self.reg, self.repo);
        if !self.tag.is_empty() {
            url.push(':');
            url.push_str(&self.tag);
        }
        Some(url)
    }

    /// The `oci://reg/repo` form used by the registry client, without the tag.
    pub fn to_oci_url(&self) -> Option<String> {
        self.is_complete()
            .then(|| format!("{}{}/{}", OCI_SCHEME, self.reg, self.repo))
    }

    /// Fill empty coordinates: the registry from config, the repository as
    /// `<prefix>/<name>`, and the tag from the dependency version.
    pub fn with_defaults(&self, name: &str, version: &str, config: &OciConfig) -> OciSource {
        let reg = if self.reg.is_empty() {
            config.registry().to_string()
        } else {
            self.reg.clone()
        };
        let repo = if self.repo.is_empty() {
            format!("{}/{}", config.repo_prefix(), name)
        } else {
            self.repo.clone()
        };
        let tag = if self.tag.is_empty() {
            version.to_string()
        } else {
            self.tag.clone()
        };
        OciSource { reg, repo, tag }
    }
}

impl FromStr for OciSource {
    type Err = InvalidOciUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OciSource::parse_url(s)
    }
}

impl fmt::Display for OciSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_canonical_url() {
            Some(url) => f.write_str(&url),
            None => write!(f, "<default registry>:{}", self.tag),
        }
    }
}
