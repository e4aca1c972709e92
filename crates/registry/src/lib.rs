mod error;
mod meta_cache;
mod package_distribution;
mod package_document;
mod version_metadata;

pub use error::RegistryError;
pub use meta_cache::{CacheError, MetadataCache};
pub use package_distribution::PackageDistribution;
pub use package_document::{FetchPackageDocumentError, PackageDocument};
pub use version_metadata::VersionMetadata;
