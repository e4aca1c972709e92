use derive_more::From;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    path::{self, PathBuf},
};

/// Escape a package name so that it forms a single path segment.
///
/// Scoped names contain a `/` which would otherwise create a nested
/// directory: `@scope/name` becomes `@scope_name`.
pub fn escape_package_name(name: &str) -> String {
    name.replace('/', "_")
}

/// Name of the directory that holds one extracted `(name, version)` pair,
/// used both in the store and in the virtual store under `node_modules/.yap`.
pub fn store_folder_name(name: &str, version: impl Display) -> String {
    format!("{0}@{1}", escape_package_name(name), version)
}

/// Represent the store directory.
///
/// * The store holds one extracted directory per `(name, version)` pair.
/// * Files in `node_modules` are hardlinks to the files in the store.
/// * Registry documents are cached under `.yap_cache` inside the store.
#[derive(Debug, Clone, PartialEq, Eq, From, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StoreDir {
    /// Path to the root of the store directory from which all sub-paths are derived.
    root: PathBuf,
}

impl StoreDir {
    /// Construct an instance of [`StoreDir`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        root.into().into()
    }

    /// Create an object that [displays](std::fmt::Display) the root of the store directory.
    pub fn display(&self) -> path::Display {
        self.root.display()
    }

    /// Directory of an extracted package: `{store}/{escape(name)}@{version}`.
    pub fn package_dir(&self, name: &str, version: impl Display) -> PathBuf {
        self.root.join(store_folder_name(name, version))
    }

    /// Whether `(name, version)` has already been extracted into the store.
    pub fn has(&self, name: &str, version: impl Display) -> bool {
        self.package_dir(name, version).is_dir()
    }

    /// The directory that caches registry documents, one file per package name.
    pub fn metadata_cache_dir(&self) -> PathBuf {
        self.root.join(".yap_cache")
    }

    /// Scratch path a tarball is downloaded to before extraction.
    /// Removed once its package has been extracted.
    pub fn scratch_tarball_path(&self, name: &str, version: impl Display) -> PathBuf {
        self.root.join(format!("{0}.tgz", store_folder_name(name, version)))
    }

    /// Extraction target that is renamed to [`package_dir`](Self::package_dir)
    /// in one step, so the store never exposes a half-extracted package.
    pub fn partial_dir(&self, name: &str, version: impl Display) -> PathBuf {
        self.root.join(format!("{0}.partial", store_folder_name(name, version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_scoped_package_name() {
        assert_eq!(escape_package_name("@fastify/error"), "@fastify_error");
        assert_eq!(escape_package_name("fast-querystring"), "fast-querystring");
    }

    #[test]
    fn generate_correct_store_folder_name() {
        assert_eq!(store_folder_name("@fastify/error", "3.3.0"), "@fastify_error@3.3.0");
        assert_eq!(store_folder_name("fast-querystring", "1.1.0"), "fast-querystring@1.1.0");
    }

    #[test]
    fn derive_sub_paths_from_root() {
        let store_dir = StoreDir::new("/home/user/project/.yap_store");
        assert_eq!(
            store_dir.package_dir("@fastify/error", "3.3.0"),
            PathBuf::from("/home/user/project/.yap_store/@fastify_error@3.3.0"),
        );
        assert_eq!(
            store_dir.metadata_cache_dir(),
            PathBuf::from("/home/user/project/.yap_store/.yap_cache"),
        );
        assert_eq!(
            store_dir.scratch_tarball_path("chalk", "5.2.0"),
            PathBuf::from("/home/user/project/.yap_store/chalk@5.2.0.tgz"),
        );
        assert_eq!(
            store_dir.partial_dir("chalk", "5.2.0"),
            PathBuf::from("/home/user/project/.yap_store/chalk@5.2.0.partial"),
        );
    }
}
