use crate::{CacheError, MetadataCache, RegistryError, VersionMetadata};
use derive_more::{Display, Error};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use yap_network::ThrottledClient;
use yap_npmrc::Npmrc;

/// `Accept` value asking the registry for the abbreviated install document.
const ACCEPT_INSTALL_DOCUMENT: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

/// Registry document for one package name.
///
/// Only the fields the installer reads are kept; the rest of the (large)
/// document is dropped at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDocument {
    pub name: String,
    #[serde(default, rename = "dist-tags", skip_serializing_if = "HashMap::is_empty")]
    pub dist_tags: HashMap<String, String>,
    pub versions: HashMap<String, VersionMetadata>,
}

/// Error type of [`PackageDocument::fetch_cached`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum FetchPackageDocumentError {
    #[diagnostic(transparent)]
    Registry(#[error(source)] RegistryError),

    #[diagnostic(transparent)]
    Cache(#[error(source)] CacheError),
}

impl PackageDocument {
    /// `GET {registry}{name}` with the abbreviated-document `Accept` header
    /// and, when configured, a bearer token.
    ///
    /// Both headers are set on the request, never on the shared client.
    pub async fn fetch_from_registry(
        name: &str,
        http_client: &ThrottledClient,
        config: &Npmrc,
    ) -> Result<Self, RegistryError> {
        let url = format!("{0}{name}", config.registry);

        let response = http_client
            .run_with_permit(|client| {
                let mut request = client.get(&url).header("accept", ACCEPT_INSTALL_DOCUMENT);
                if let Some(token) = &config.auth_token {
                    request = request.bearer_auth(token);
                }
                request.send()
            })
            .await
            .map_err(|error| RegistryError::Transport { url: url.clone(), error })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Network {
                url,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response
            .json::<PackageDocument>()
            .await
            .map_err(|error| RegistryError::Metadata { url, error })
    }

    /// Read-through fetch: consult `cache` first, hit the registry on a
    /// miss and populate the cache with the response.
    pub async fn fetch_cached(
        name: &str,
        http_client: &ThrottledClient,
        config: &Npmrc,
        cache: &MetadataCache,
    ) -> Result<Self, FetchPackageDocumentError> {
        if let Some(document) = cache.get(name).map_err(FetchPackageDocumentError::Cache)? {
            tracing::debug!(target: "yap::resolve", name, "Metadata cache hit");
            return Ok(document);
        }
        let document = PackageDocument::fetch_from_registry(name, http_client, config)
            .await
            .map_err(FetchPackageDocumentError::Registry)?;
        cache.put(name, &document).map_err(FetchPackageDocumentError::Cache)?;
        Ok(document)
    }
}
