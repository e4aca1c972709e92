use derive_more::{Display, Error};
use miette::Diagnostic;
use std::env;
use yap_lockfile::{LoadLockfileError, Lockfile};
use yap_network::ThrottledClient;
use yap_npmrc::Npmrc;
use yap_package_manager::{Install, InstallError};
use yap_package_manifest::{PackageManifest, PackageManifestError};

/// Application state of a `yap install` run.
pub struct State {
    /// HTTP client shared by metadata and tarball requests.
    pub http_client: ThrottledClient,
    /// Configuration from the `.npmrc` files.
    pub config: &'static Npmrc,
    /// Data from the `package.json` file.
    pub manifest: PackageManifest,
    /// Data from the `yap.lock` file, when present.
    pub lockfile: Option<Lockfile>,
}

/// Error type of [`State::init`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InitStateError {
    #[display("failed to determine the current directory: {_0}")]
    #[diagnostic(code(yap_cli::current_dir))]
    CurrentDir(#[error(source)] std::io::Error),

    #[diagnostic(transparent)]
    LoadManifest(#[error(source)] PackageManifestError),

    #[diagnostic(transparent)]
    LoadLockfile(#[error(source)] LoadLockfileError),
}

impl State {
    /// Initialize the application state from the current working directory.
    pub fn init() -> Result<Self, InitStateError> {
        let current_dir = env::current_dir().map_err(InitStateError::CurrentDir)?;
        Ok(State {
            http_client: ThrottledClient::default(),
            config: Npmrc::current(&current_dir).leak(),
            manifest: PackageManifest::from_path(current_dir.join("package.json"))
                .map_err(InitStateError::LoadManifest)?,
            lockfile: Lockfile::load_from_dir(&current_dir)
                .map_err(InitStateError::LoadLockfile)?,
        })
    }

    /// Jobs of the `install` command.
    pub async fn install(self) -> Result<(), InstallError> {
        let State { http_client, config, manifest, lockfile } = self;
        Install { http_client: &http_client, config, manifest: &manifest, lockfile }.run().await
    }
}
