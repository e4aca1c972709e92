use derive_more::{Display, Error};
use miette::Diagnostic;

/// Error type of registry metadata requests.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum RegistryError {
    #[display("failed to fetch {url}: {status} {reason}")]
    #[diagnostic(code(yap_registry::network_error))]
    Network { url: String, status: u16, reason: String },

    #[display("failed to request {url}: {error}")]
    #[diagnostic(code(yap_registry::transport_error))]
    Transport {
        url: String,
        #[error(source)]
        error: reqwest::Error,
    },

    #[display("failed to parse the registry document from {url}: {error}")]
    #[diagnostic(code(yap_registry::metadata_error))]
    Metadata {
        url: String,
        #[error(source)]
        error: reqwest::Error,
    },
}
