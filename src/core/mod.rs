//! Core data structures for kpm packages.
//!
//! This module contains the manifest and lock-file model:
//! - Dependency sources (local, git, OCI) and their flat record keys
//! - Dependency entries and the insertion-ordered dependency table
//! - The `kcl.mod` manifest and the `kcl.mod.lock` lock file

pub mod dependencies;
pub mod dependency;
pub mod errors;
pub mod lockfile;
pub mod manifest;
pub mod oci;
pub mod package;
pub mod source;
pub mod workspace;

pub use dependencies::DependencyTable;
pub use dependency::{Dependency, RecordStyle};
pub use errors::{ErrorKind, ManifestError};
pub use lockfile::LockFile;
pub use manifest::{Manifest, PackageMetadata, Profile, UnknownKeyPolicy};
pub use oci::OciSource;
pub use package::{collect_package_files, PackageFilter};
pub use source::{DependencySource, GitSource, LocalSource, SourceKind};
pub use workspace::{find_lockfile, find_manifest, LOCKFILE_NAME, MANIFEST_NAME};
