mod create_virtual_store;
mod fetch_packages;
mod install;
mod link_error;
mod resolve;
mod symlink_dependencies;
mod symlink_packages;

pub use create_virtual_store::CreateVirtualStore;
pub use fetch_packages::FetchPackages;
pub use install::{Install, InstallError};
pub use link_error::LinkError;
pub use resolve::{InstallPlan, ResolveDependencies, ResolveError, SeenPackages};
pub use symlink_dependencies::SymlinkDependencies;
pub use symlink_packages::SymlinkPackages;
