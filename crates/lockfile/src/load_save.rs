use crate::Lockfile;
use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{fs, io, path::Path, path::PathBuf};

/// Error type of [`Lockfile::load_from_dir`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LoadLockfileError {
    #[display("failed to read lockfile {path:?}: {error}")]
    #[diagnostic(code(yap_lockfile::read_failure))]
    Read {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to parse lockfile {path:?}: {error}")]
    #[diagnostic(
        code(yap_lockfile::parse_failure),
        help("delete yap.lock to resolve from the registry again")
    )]
    Parse {
        path: PathBuf,
        #[error(source)]
        error: serde_json::Error,
    },
}

/// Error type of [`Lockfile::save_to_dir`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum SaveLockfileError {
    #[display("failed to serialize the lockfile: {error}")]
    #[diagnostic(code(yap_lockfile::serialize_failure))]
    Serialize {
        #[error(source)]
        error: serde_json::Error,
    },

    #[display("failed to write lockfile {path:?}: {error}")]
    #[diagnostic(code(yap_lockfile::write_failure))]
    Write {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },
}

impl Lockfile {
    /// Deserialize `{dir}/yap.lock` if it exists.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Lockfile>, LoadLockfileError> {
        let path = dir.join(Lockfile::FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(LoadLockfileError::Read { path, error }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|error| LoadLockfileError::Parse { path, error })
    }

    /// Overwrite `{dir}/yap.lock` with this plan.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), SaveLockfileError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|error| SaveLockfileError::Serialize { error })?;
        let path = dir.join(Lockfile::FILE_NAME);
        fs::write(&path, content + "\n").map_err(|error| SaveLockfileError::Write { path, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanEntry;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn sample_lockfile() -> Lockfile {
        Lockfile::new(vec![
            PlanEntry {
                name: "b".to_string(),
                version: "1.1.0".parse().unwrap(),
                tarball: "https://registry.npmjs.org/b/-/b-1.1.0.tgz".to_string(),
                dependencies: BTreeMap::new(),
            },
            PlanEntry {
                name: "a".to_string(),
                version: "1.0.0".parse().unwrap(),
                tarball: "https://registry.npmjs.org/a/-/a-1.0.0.tgz".to_string(),
                dependencies: BTreeMap::from([("b".to_string(), "^1".to_string())]),
            },
        ])
    }

    #[test]
    fn absent_lockfile_loads_as_none() {
        let dir = tempdir().unwrap();
        assert_eq!(Lockfile::load_from_dir(dir.path()).unwrap(), None);
    }

    #[test]
    fn save_then_load_preserves_the_plan_order() {
        let dir = tempdir().unwrap();
        let lockfile = sample_lockfile();
        lockfile.save_to_dir(dir.path()).unwrap();
        let loaded = Lockfile::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, lockfile);
        assert_eq!(loaded.packages[0].name, "b");
        assert_eq!(loaded.packages[1].name, "a");
    }

    #[test]
    fn save_is_deterministic() {
        let dir = tempdir().unwrap();
        sample_lockfile().save_to_dir(dir.path()).unwrap();
        let first = fs::read_to_string(dir.path().join(Lockfile::FILE_NAME)).unwrap();
        sample_lockfile().save_to_dir(dir.path()).unwrap();
        let second = fs::read_to_string(dir.path().join(Lockfile::FILE_NAME)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unparseable_lockfile_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(Lockfile::FILE_NAME), "not json").unwrap();
        assert!(matches!(
            Lockfile::load_from_dir(dir.path()),
            Err(LoadLockfileError::Parse { .. }),
        ));
    }
}
