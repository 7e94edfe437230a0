//! Manifest and lock-file error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while decoding, encoding, loading or saving
/// `kcl.mod` / `kcl.mod.lock`.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed manifest{}: {reason}", display_path(.path))]
    MalformedManifest {
        path: Option<PathBuf>,
        reason: String,
    },

    #[error("dependency `{key}` has no recognizable source: {reason}")]
    UnknownSourceKind { key: String, reason: String },

    #[error("locked dependency `{key}` has no checksum")]
    MissingChecksum { key: String },

    #[error("`{}` not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Category of a [`ManifestError`], for callers that only report the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedManifest,
    UnknownSourceKind,
    MissingChecksum,
    NotFound,
    Io,
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" `{}`", p.display()),
        None => String::new(),
    }
}

impl ManifestError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ManifestError::MalformedManifest {
            path: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_source(key: &str, reason: impl Into<String>) -> Self {
        ManifestError::UnknownSourceKind {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the file a malformed document was read from.
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            ManifestError::MalformedManifest { path: None, reason } => {
                ManifestError::MalformedManifest {
                    path: Some(file.into()),
                    reason,
                }
            }
            other => other,
        }
    }

    /// Get the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ManifestError::MalformedManifest { .. } => ErrorKind::MalformedManifest,
            ManifestError::UnknownSourceKind { .. } => ErrorKind::UnknownSourceKind,
            ManifestError::MissingChecksum { .. } => ErrorKind::MissingChecksum,
            ManifestError::NotFound { .. } => ErrorKind::NotFound,
            ManifestError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Result alias used by the codec layer.
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
