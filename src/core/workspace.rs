//! Package root discovery and conventional file names.

use std::path::{Path, PathBuf};

/// Conventional manifest file name.
pub const MANIFEST_NAME: &str = "kcl.mod";

/// Conventional lock file name.
pub const LOCKFILE_NAME: &str = "kcl.mod.lock";

/// Path of the manifest inside a package directory.
pub fn manifest_path(package_dir: &Path) -> PathBuf {
    package_dir.join(MANIFEST_NAME)
}

/// Path of the lock file inside a package directory.
pub fn lockfile_path(package_dir: &Path) -> PathBuf {
    package_dir.join(LOCKFILE_NAME)
}

/// Find the nearest manifest, searching `start` and then its parents.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(manifest_path)
        .find(|candidate| candidate.is_file())
}

/// Find the lock file next to the nearest manifest.
pub fn find_lockfile(start: &Path) -> Option<PathBuf> {
    let manifest = find_manifest(start)?;
    let lockfile = manifest.with_file_name(LOCKFILE_NAME);
    lockfile.is_file().then_some(lockfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_manifest_in_parent() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "").unwrap();
        let nested = tmp.path().join("sub/dir");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_manifest(&nested), Some(tmp.path().join(MANIFEST_NAME)));
        assert_eq!(find_lockfile(&nested), None);

        std::fs::write(tmp.path().join(LOCKFILE_NAME), "").unwrap();
        assert_eq!(find_lockfile(&nested), Some(tmp.path().join(LOCKFILE_NAME)));
    }

    #[test]
    fn test_paths() {
        let dir = Path::new("pkg");
        assert!(manifest_path(dir).ends_with("kcl.mod"));
        assert!(lockfile_path(dir).ends_with("kcl.mod.lock"));
    }
}
