//! kcl-mod - manifest and lock-file model for the KCL package manager
//!
//! This crate describes a package's identity, its declared dependencies and
//! their locked state, and reads and writes them as `kcl.mod` and
//! `kcl.mod.lock`. Fetching, resolution and building live elsewhere and
//! call in through [`ops`].

pub mod core;
pub mod ops;
pub mod util;

/// Test fixtures shared by unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    dependency::Dependency, dependencies::DependencyTable, errors::ManifestError,
    lockfile::LockFile, manifest::Manifest, oci::OciSource, source::DependencySource,
};

pub use crate::ops::{load_lock_file, load_mod_file, save_lock_file};
pub use crate::util::Config;
