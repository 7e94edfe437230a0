//! Load and save operations on package directories.
//!
//! These are the entry points used by the resolver and the command layer:
//! they read and write the conventionally named files and apply the
//! package's configuration.

pub mod lockfile;
pub mod mod_file;

pub use lockfile::{load_lock_file, save_lock_file};
pub use mod_file::{load_mod_file, load_mod_file_with, save_mod_file};
