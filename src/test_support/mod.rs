//! Test utilities for kcl-mod unit tests.
//!
//! Provides sample manifests and lock files shared between the codec tests.

pub mod fixtures;

pub use fixtures::*;
