//! Package file selection from `include`/`exclude` patterns.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::core::errors::{ManifestError, Result};
use crate::core::manifest::PackageMetadata;
use crate::util::fs;

/// Compiled `include`/`exclude` patterns of a package.
///
/// A pattern matches a path when it matches the path itself or any of its
/// parent directories, so `src/` and `src` both select everything under
/// `src`. An empty include list selects every file; exclusion wins.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

fn compile(patterns: &[String], field: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p.trim_end_matches('/')).map_err(|e| {
                ManifestError::malformed(format!("invalid `package.{}` pattern `{}`: {}", field, p, e))
            })
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], path: &Path) -> bool {
    path.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| patterns.iter().any(|pattern| pattern.matches_path(p)))
}

impl PackageFilter {
    pub fn new(package: &PackageMetadata) -> Result<Self> {
        Ok(PackageFilter {
            include: compile(&package.include, "include")?,
            exclude: compile(&package.exclude, "exclude")?,
        })
    }

    /// Whether a path relative to the package root is packaged.
    pub fn is_packaged(&self, rel_path: &Path) -> bool {
        if matches_any(&self.exclude, rel_path) {
            return false;
        }
        self.include.is_empty() || matches_any(&self.include, rel_path)
    }
}

/// Files under `root` selected by the package's patterns, relative to `root`.
pub fn collect_package_files(root: &Path, package: &PackageMetadata) -> Result<Vec<PathBuf>> {
    let filter = PackageFilter::new(package)?;
    let files: Vec<PathBuf> = fs::relative_files(root)?
        .into_iter()
        .filter(|rel| filter.is_packaged(rel))
        .collect();
    tracing::debug!(
        "selected {} files for package `{}`",
        files.len(),
        package.name
    );
    Ok(files)
}
