mod error;

pub use error::TarballError;

use dashmap::DashSet;
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use tar::Archive;
use yap_network::ThrottledClient;
use yap_store_dir::{store_folder_name, StoreDir};

/// Store folder names whose tarballs have been claimed during this run.
///
/// The single atomic insert on this set is what keeps concurrent jobs for
/// the same `(name, version)` down to one fetch.
pub type DownloadedSet = DashSet<String>;

/// This subroutine downloads a package tarball and populates its store
/// directory:
/// * Skip when the store directory already exists or another task already
///   claimed this `(name, version)`.
/// * Write the gzip tarball to a scratch path.
/// * Extract the members under `package/` (prefix stripped) into a partial
///   directory; members outside `package/` are ignored.
/// * Rename the partial directory into place and remove the scratch file,
///   so the store entry is either fully extracted or absent.
#[must_use]
pub struct DownloadTarballToStore<'a> {
    pub http_client: &'a ThrottledClient,
    pub store_dir: &'a StoreDir,
    pub downloaded: &'a DownloadedSet,
    pub auth_token: Option<&'a str>,
    pub package_name: &'a str,
    pub package_version: &'a str,
    pub package_url: &'a str,
}

impl<'a> DownloadTarballToStore<'a> {
    /// Execute the subroutine. Returns the path of the store directory.
    pub async fn run(self) -> Result<PathBuf, TarballError> {
        let DownloadTarballToStore {
            http_client,
            store_dir,
            downloaded,
            auth_token,
            package_name: name,
            package_version: version,
            package_url: url,
        } = self;

        let package_dir = store_dir.package_dir(name, version);
        if package_dir.is_dir() {
            tracing::debug!(target: "yap::fetch", name, version, "Store hit");
            return Ok(package_dir);
        }
        if !downloaded.insert(store_folder_name(name, version)) {
            tracing::debug!(target: "yap::fetch", name, version, "Claimed by another job");
            return Ok(package_dir);
        }

        tracing::info!(target: "yap::fetch", name, version, url, "Downloading");

        let io_error = |path: &Path| {
            let (url, path) = (url.to_string(), path.to_path_buf());
            move |error| TarballError::Io { url, path, error }
        };

        let response = http_client
            .run_with_permit(|client| {
                let mut request = client.get(url);
                if let Some(token) = auth_token {
                    request = request.bearer_auth(token);
                }
                request.send()
            })
            .await
            .map_err(|error| TarballError::Transport { url: url.to_string(), error })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TarballError::Network {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }
        let compressed = response
            .bytes()
            .await
            .map_err(|error| TarballError::Transport { url: url.to_string(), error })?;

        let scratch_path = store_dir.scratch_tarball_path(name, version);
        if let Some(parent) = scratch_path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&scratch_path, &compressed).map_err(io_error(&scratch_path))?;

        let data = zune_inflate::DeflateDecoder::new(&compressed)
            .decode_gzip()
            .map_err(|error| TarballError::Decompression {
                url: url.to_string(),
                detail: format!("{error:?}"),
            })?;

        let partial_dir = store_dir.partial_dir(name, version);
        if partial_dir.exists() {
            // Leftover of an interrupted run.
            fs::remove_dir_all(&partial_dir).map_err(io_error(&partial_dir))?;
        }
        extract_package_members(&data, &partial_dir, url)?;

        if package_dir.is_dir() {
            // Lost a race against another process; its extraction is as
            // good as ours.
            fs::remove_dir_all(&partial_dir).map_err(io_error(&partial_dir))?;
        } else {
            fs::rename(&partial_dir, &package_dir).map_err(io_error(&package_dir))?;
        }
        fs::remove_file(&scratch_path).map_err(io_error(&scratch_path))?;

        Ok(package_dir)
    }
}

/// Unpack the members of `data` whose paths start with `package/` into
/// `destination`, with the prefix stripped. Other members are skipped.
fn extract_package_members(
    data: &[u8],
    destination: &Path,
    url: &str,
) -> Result<(), TarballError> {
    let io_error = |path: PathBuf| {
        let url = url.to_string();
        move |error| TarballError::Io { url, path, error }
    };

    fs::create_dir_all(destination).map_err(io_error(destination.to_path_buf()))?;

    let mut archive = Archive::new(Cursor::new(data));
    let entries = archive.entries().map_err(io_error(destination.to_path_buf()))?;
    for entry in entries {
        let mut entry = entry.map_err(io_error(destination.to_path_buf()))?;
        let member_path = entry
            .path()
            .map_err(io_error(destination.to_path_buf()))?
            .into_owned();
        let Ok(stripped) = member_path.strip_prefix("package") else { continue };
        if stripped.as_os_str().is_empty() {
            continue;
        }
        let target = destination.join(stripped);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent.to_path_buf()))?;
        }
        entry.unpack(&target).map_err(io_error(target.clone()))?;
    }
    Ok(())
}
