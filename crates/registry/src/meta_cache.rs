use crate::PackageDocument;
use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{fs, io, path::PathBuf};
use yap_store_dir::escape_package_name;

/// Error type of [`MetadataCache`] operations.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum CacheError {
    #[display("cache file {path:?} exists but cannot be deserialized: {error}")]
    #[diagnostic(
        code(yap_registry::cache_corrupt),
        help("delete the file to re-fetch the registry document")
    )]
    Corrupt {
        path: PathBuf,
        #[error(source)]
        error: serde_json::Error,
    },

    #[display("failed to read cache file {path:?}: {error}")]
    #[diagnostic(code(yap_registry::cache_read_failure))]
    Read {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to write cache file {path:?}: {error}")]
    #[diagnostic(code(yap_registry::cache_write_failure))]
    Write {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to serialize the registry document of {name}: {error}")]
    #[diagnostic(code(yap_registry::cache_serialize_failure))]
    Serialize {
        name: String,
        #[error(source)]
        error: serde_json::Error,
    },
}

/// On-disk read-through cache of registry documents, one JSON file per
/// package name (`/` escaped to `_` so scoped names are single files).
///
/// Documents are cached indefinitely; there is no eviction.
#[derive(Debug)]
pub struct MetadataCache {
    dir: PathBuf,
}

impl MetadataCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        MetadataCache { dir: dir.into() }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(escape_package_name(name))
    }

    /// Read a cached document. Absence is not an error; a file that exists
    /// but does not deserialize is.
    pub fn get(&self, name: &str) -> Result<Option<PackageDocument>, CacheError> {
        let path = self.file_path(name);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(CacheError::Read { path, error }),
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|error| CacheError::Corrupt { path, error })
    }

    /// Write through a temporary file and rename, so a concurrent reader
    /// never observes a half-written document.
    pub fn put(&self, name: &str, document: &PackageDocument) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .map_err(|error| CacheError::Write { path: self.dir.clone(), error })?;
        let content = serde_json::to_vec(document)
            .map_err(|error| CacheError::Serialize { name: name.to_string(), error })?;
        let path = self.file_path(name);
        let temp_path = self.dir.join(format!("{0}.tmp", escape_package_name(name)));
        fs::write(&temp_path, content)
            .map_err(|error| CacheError::Write { path: temp_path.clone(), error })?;
        fs::rename(&temp_path, &path).map_err(|error| CacheError::Write { path, error })
    }
}
