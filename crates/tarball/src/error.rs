use derive_more::{Display, Error};
use miette::Diagnostic;
use std::path::PathBuf;

/// Error type of [`DownloadTarballToStore`](crate::DownloadTarballToStore).
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum TarballError {
    #[display("failed to fetch {url}: {status} {reason}")]
    #[diagnostic(code(yap_tarball::network_error))]
    Network { url: String, status: u16, reason: String },

    #[display("failed to request {url}: {error}")]
    #[diagnostic(code(yap_tarball::transport_error))]
    Transport {
        url: String,
        #[error(source)]
        error: reqwest::Error,
    },

    #[display("failed to decompress the tarball from {url}: {detail}")]
    #[diagnostic(code(yap_tarball::decompression_error))]
    Decompression {
        url: String,
        #[error(not(source))]
        detail: String,
    },

    #[display("io error while extracting {url} to {path:?}: {error}")]
    #[diagnostic(code(yap_tarball::io_error))]
    Io {
        url: String,
        path: PathBuf,
        #[error(source)]
        error: std::io::Error,
    },
}
