//! Lock file I/O operations.

use std::path::Path;

use crate::core::errors::{ErrorKind, Result};
use crate::core::workspace::lockfile_path;
use crate::core::LockFile;

/// Load `kcl.mod.lock` from a package directory.
///
/// A missing lock file is not an error: the package simply has not been
/// resolved yet.
pub fn load_lock_file(package_dir: &Path) -> Result<Option<LockFile>> {
    match LockFile::load(&lockfile_path(package_dir)) {
        Ok(lock) => Ok(Some(lock)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write `kcl.mod.lock` into a package directory.
pub fn save_lock_file(package_dir: &Path, lock: &LockFile) -> Result<()> {
    lock.save(&lockfile_path(package_dir))
}
