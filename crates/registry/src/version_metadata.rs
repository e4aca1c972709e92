use crate::PackageDistribution;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata of a single published version, reduced to the fields the
/// installer reads. Nested `devDependencies` and `peerDependencies` are
/// deliberately dropped; only the root manifest merges those groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub dist: PackageDistribution,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dependencies: HashMap<String, String>,
}
