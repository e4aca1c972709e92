use derive_more::{Display, Error};
use miette::Diagnostic;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use strum::IntoStaticStr;

/// Error type of [`PackageManifest`] operations.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum PackageManifestError {
    #[display("no package.json was found at {path:?}")]
    #[diagnostic(
        code(yap_package_manifest::manifest_not_found),
        help("run yap from a directory that contains a package.json")
    )]
    NotFound { path: PathBuf },

    #[display("failed to read {path:?}: {error}")]
    #[diagnostic(code(yap_package_manifest::io_error))]
    Io {
        path: PathBuf,
        #[error(source)]
        error: std::io::Error,
    },

    #[display("failed to parse {path:?}: {error}")]
    #[diagnostic(code(yap_package_manifest::serialization_error))]
    Serialization {
        path: PathBuf,
        #[error(source)]
        error: serde_json::Error,
    },
}

/// Groups of dependency declarations in `package.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum DependencyGroup {
    #[strum(serialize = "dependencies")]
    Prod,
    #[strum(serialize = "devDependencies")]
    Dev,
    #[strum(serialize = "peerDependencies")]
    Peer,
}

/// Content of the `package.json` file and its path.
#[derive(Debug)]
pub struct PackageManifest {
    path: PathBuf,
    value: Value,
}

impl PackageManifest {
    pub fn from_path(path: PathBuf) -> Result<Self, PackageManifestError> {
        if !path.exists() {
            return Err(PackageManifestError::NotFound { path });
        }
        let content = fs::read_to_string(&path)
            .map_err(|error| PackageManifestError::Io { path: path.clone(), error })?;
        let value = serde_json::from_str(&content)
            .map_err(|error| PackageManifestError::Serialization { path: path.clone(), error })?;
        Ok(PackageManifest { path, value })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merged `{name → specifier}` mapping over `groups`.
    /// Later groups override earlier ones on name collision.
    pub fn dependencies(
        &self,
        groups: impl IntoIterator<Item = DependencyGroup>,
    ) -> HashMap<&str, &str> {
        let mut merged = HashMap::new();
        for group in groups {
            let key: &'static str = group.into();
            let Some(Value::Object(entries)) = self.value.get(key) else { continue };
            for (name, specifier) in entries {
                if let Value::String(specifier) = specifier {
                    merged.insert(name.as_str(), specifier.as_str());
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn manifest_with(content: &str) -> (tempfile::TempDir, PackageManifest) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, content).unwrap();
        let manifest = PackageManifest::from_path(path).unwrap();
        (dir, manifest)
    }

    #[test]
    fn merge_dependency_groups_with_later_groups_winning() {
        let (_dir, manifest) = manifest_with(
            r#"{
                "dependencies": { "chalk": "^5.0.0", "shared": "^1.0.0" },
                "devDependencies": { "vitest": "^1.0.0", "shared": "^1.2.0" },
                "peerDependencies": { "react": ">=18" }
            }"#,
        );
        let dependencies =
            manifest.dependencies([DependencyGroup::Prod, DependencyGroup::Dev, DependencyGroup::Peer]);
        assert_eq!(dependencies.len(), 4);
        assert_eq!(dependencies["chalk"], "^5.0.0");
        assert_eq!(dependencies["vitest"], "^1.0.0");
        assert_eq!(dependencies["react"], ">=18");
        assert_eq!(dependencies["shared"], "^1.2.0");
    }

    #[test]
    fn absent_groups_are_empty() {
        let (_dir, manifest) = manifest_with(r#"{ "name": "app" }"#);
        assert!(manifest
            .dependencies([DependencyGroup::Prod, DependencyGroup::Dev, DependencyGroup::Peer])
            .is_empty());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempdir().unwrap();
        let error = PackageManifest::from_path(dir.path().join("package.json")).unwrap_err();
        assert!(matches!(error, PackageManifestError::NotFound { .. }));
    }
}
