//! Manifest I/O operations.

use std::path::Path;

use crate::core::errors::Result;
use crate::core::workspace::manifest_path;
use crate::core::Manifest;
use crate::util::config::{self, Config};

/// Load `kcl.mod` from a package directory, honouring the package's config.
///
/// Fails with `NotFound` if the directory has no manifest and with
/// `MalformedManifest` if it cannot be parsed.
pub fn load_mod_file(package_dir: &Path) -> Result<Manifest> {
    load_mod_file_with(package_dir, &config::config_for(package_dir))
}

/// Load `kcl.mod` from a package directory with an explicit config.
pub fn load_mod_file_with(package_dir: &Path, config: &Config) -> Result<Manifest> {
    Manifest::load_with(
        &manifest_path(package_dir),
        config.manifest.unknown_key_policy(),
    )
}

/// Write `kcl.mod` into a package directory.
pub fn save_mod_file(package_dir: &Path, manifest: &Manifest) -> Result<()> {
    manifest.save(&manifest_path(package_dir))
}
