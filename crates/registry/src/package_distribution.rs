use serde::{Deserialize, Serialize};

/// The `dist` object of a registry version. Only the tarball URL is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDistribution {
    pub tarball: String,
}
