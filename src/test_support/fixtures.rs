//! Sample manifests and lock files.

use crate::core::{
    Dependency, DependencySource, DependencyTable, LockFile, Manifest, OciSource, PackageMetadata,
};

/// A manifest written by hand, using the shorthand dependency forms.
pub const BASIC_MANIFEST: &str = r#"[package]
name = "MyKcl"
edition = "v0.0.1"
version = "v0.0.1"
include = ["src/", "README.md", "LICENSE"]
exclude = ["target/", ".git/", "*.log"]

[dependencies]
MyOciKcl1 = "0.0.1"
MyKcl1 = { git = "https://github.com/test/MyKcl1.git", tag = "v0.0.2" }
"#;

/// Git dependency without a version, pinned by tag.
pub fn git_dependency() -> Dependency {
    Dependency::new(
        "MyKcl1",
        "",
        DependencySource::git_tag("https://github.com/test/MyKcl1.git", "v0.0.2"),
    )
}

/// Default-registry OCI dependency.
pub fn oci_dependency() -> Dependency {
    Dependency::new("MyOciKcl1", "0.0.1", OciSource::from_tag("0.0.1"))
}

/// The in-memory counterpart of a typical `kcl.mod`, OCI entry first.
pub fn sample_manifest() -> Manifest {
    let mut dependencies = DependencyTable::new();
    dependencies.insert("MyOciKcl1", oci_dependency());
    dependencies.insert("MyKcl1", git_dependency());

    Manifest {
        package: PackageMetadata {
            name: "MyKcl".into(),
            edition: "v0.0.1".into(),
            version: "v0.0.1".into(),
            description: None,
            include: vec!["src/".into(), "README.md".into(), "LICENSE".into()],
            exclude: vec!["target/".into(), ".git/".into(), "*.log".into()],
        },
        dependencies,
        profile: None,
    }
}

/// A resolved lock file: git entry first, then an OCI entry with coordinates.
pub fn sample_lock() -> LockFile {
    let git = Dependency {
        version: "v0.0.2".into(),
        ..git_dependency()
    }
    .with_sum("hjkasdahjksdasdhjk");
    let oci = Dependency::new(
        "MyOciKcl1",
        "0.0.1",
        OciSource::new("test_reg", "test_repo", "0.0.1"),
    )
    .with_sum("hjkasdahjksdasdhjk");

    let mut dependencies = DependencyTable::new();
    dependencies.insert("MyKcl1", git);
    dependencies.insert("MyOciKcl1", oci);
    LockFile::new(dependencies)
}
