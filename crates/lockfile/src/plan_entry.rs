use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use yap_semver::Version;

/// One record of the install plan: a package pinned to a version, the
/// tarball it comes from, and its declared dependencies.
///
/// Within a plan, entries are unique per name and every dependency's entry
/// precedes its dependents'. Dependencies are sorted by name so the
/// serialized lockfile is byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,
    pub version: Version,
    pub tarball: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

impl PlanEntry {
    /// Directory name of this entry in the store and the virtual store,
    /// e.g. `@fastify/error@3.3.0` → `@fastify_error@3.3.0`.
    pub fn store_folder_name(&self) -> String {
        yap_store_dir::store_folder_name(&self.name, &self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn store_folder_name_escapes_scoped_names() {
        let entry = PlanEntry {
            name: "@fastify/error".to_string(),
            version: "3.3.0".parse().unwrap(),
            tarball: "https://registry.npmjs.org/@fastify/error/-/error-3.3.0.tgz".to_string(),
            dependencies: BTreeMap::new(),
        };
        assert_eq!(entry.store_folder_name(), "@fastify_error@3.3.0");
    }
}
