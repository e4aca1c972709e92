use crate::{
    CreateVirtualStore, FetchPackages, LinkError, ResolveDependencies, ResolveError, SeenPackages,
    SymlinkDependencies, SymlinkPackages,
};
use derive_more::{Display, Error};
use miette::Diagnostic;
use pipe_trait::Pipe;
use yap_lockfile::{Lockfile, SaveLockfileError};
use yap_network::ThrottledClient;
use yap_npmrc::Npmrc;
use yap_package_manifest::{DependencyGroup, PackageManifest};
use yap_registry::MetadataCache;
use yap_tarball::TarballError;

/// This subroutine does everything `yap install` is supposed to do:
/// * Produce the install plan, either by resolving the manifest's merged
///   dependencies against the registry or by loading `yap.lock`.
/// * Persist the plan as `yap.lock` after a fresh resolution.
/// * Download and extract every planned package into the store.
/// * Lay out `node_modules`: hardlink farms, then root and self symlinks,
///   then dependency symlinks.
#[must_use]
pub struct Install<'a> {
    pub http_client: &'a ThrottledClient,
    pub config: &'static Npmrc,
    pub manifest: &'a PackageManifest,
    pub lockfile: Option<Lockfile>,
}

/// Error type of [`Install`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InstallError {
    #[diagnostic(transparent)]
    Resolve(#[error(source)] ResolveError),

    #[diagnostic(transparent)]
    SaveLockfile(#[error(source)] SaveLockfileError),

    #[diagnostic(transparent)]
    FetchTarball(#[error(source)] TarballError),

    #[diagnostic(transparent)]
    Layout(#[error(source)] LinkError),
}

impl Install<'_> {
    /// Execute the subroutine.
    pub async fn run(self) -> Result<(), InstallError> {
        let Install { http_client, config, manifest, lockfile } = self;

        tracing::info!(target: "yap::install", "Start all");

        let plan = match lockfile {
            Some(lockfile) => {
                tracing::info!(target: "yap::install", "Lockfile found, skipping resolution");
                lockfile.packages
            }
            None => {
                let meta_cache = config.store_dir.metadata_cache_dir().pipe(MetadataCache::new);
                let seen = SeenPackages::new();
                let plan = ResolveDependencies {
                    http_client,
                    config,
                    meta_cache: &meta_cache,
                    seen: &seen,
                }
                .run(manifest.dependencies([
                    DependencyGroup::Prod,
                    DependencyGroup::Dev,
                    DependencyGroup::Peer,
                ]))
                .await
                .map_err(InstallError::Resolve)?;

                let project_dir =
                    manifest.path().parent().expect("the manifest path names a file in a directory");
                let lockfile = Lockfile::new(plan);
                lockfile.save_to_dir(project_dir).map_err(InstallError::SaveLockfile)?;
                lockfile.packages
            }
        };

        FetchPackages { http_client, config, plan: &plan }
            .run()
            .await
            .map_err(InstallError::FetchTarball)?;

        CreateVirtualStore {
            store_dir: &config.store_dir,
            virtual_store_dir: &config.virtual_store_dir,
            plan: &plan,
        }
        .run()
        .map_err(InstallError::Layout)?;

        SymlinkPackages {
            modules_dir: &config.modules_dir,
            virtual_store_dir: &config.virtual_store_dir,
            plan: &plan,
        }
        .run()
        .map_err(InstallError::Layout)?;

        SymlinkDependencies { modules_dir: &config.modules_dir, plan: &plan }
            .run()
            .map_err(InstallError::Layout)?;

        tracing::info!(target: "yap::install", "Complete all");
        Ok(())
    }
}
