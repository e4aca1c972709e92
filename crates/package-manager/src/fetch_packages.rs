use futures_util::future;
use yap_lockfile::PlanEntry;
use yap_network::ThrottledClient;
use yap_npmrc::Npmrc;
use yap_tarball::{DownloadTarballToStore, DownloadedSet, TarballError};

/// Download and extract every planned package into the store, one job per
/// entry. Entries are independent: the post-ordered plan already encodes
/// dependency order and extraction never reads another entry.
#[must_use]
pub struct FetchPackages<'a> {
    pub http_client: &'a ThrottledClient,
    pub config: &'static Npmrc,
    pub plan: &'a [PlanEntry],
}

impl FetchPackages<'_> {
    /// Execute the subroutine.
    pub async fn run(self) -> Result<(), TarballError> {
        let FetchPackages { http_client, config, plan } = self;
        let downloaded = DownloadedSet::new();

        let tasks = plan.iter().map(|entry| {
            let downloaded = &downloaded;
            async move {
                let version = entry.version.to_string();
                DownloadTarballToStore {
                    http_client,
                    store_dir: &config.store_dir,
                    downloaded,
                    auth_token: config.auth_token.as_deref(),
                    package_name: &entry.name,
                    package_version: &version,
                    package_url: &entry.tarball,
                }
                .run()
                .await
                .map(drop)
            }
        });
        future::try_join_all(tasks).await.map(drop)
    }
}
