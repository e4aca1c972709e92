use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{io, path::PathBuf};

/// Error type of the layout stages.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LinkError {
    #[display("{name} is not in the store")]
    #[diagnostic(
        code(yap_package_manager::package_not_found),
        help("re-run the install to repopulate the store")
    )]
    PackageNotFound { name: String },

    #[display("failed to create directory {path:?}: {error}")]
    #[diagnostic(code(yap_package_manager::create_dir))]
    CreateDir {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to hardlink {from:?} to {to:?}: {error}")]
    #[diagnostic(code(yap_package_manager::hardlink))]
    Hardlink {
        from: PathBuf,
        to: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to symlink {from:?} to {to:?}: {error}")]
    #[diagnostic(code(yap_package_manager::symlink))]
    Symlink {
        from: PathBuf,
        to: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("failed to walk {path:?}: {error}")]
    #[diagnostic(code(yap_package_manager::walk))]
    Walk {
        path: PathBuf,
        #[error(source)]
        error: walkdir::Error,
    },
}
