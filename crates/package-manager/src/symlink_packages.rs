use crate::LinkError;
use std::path::Path;
use yap_fs::force_symlink_dir;
use yap_lockfile::PlanEntry;

/// Expose every planned package at `node_modules/{name}` as a symlink into
/// the virtual store, then give each one a self symlink so packages that
/// require themselves resolve.
///
/// The self link is created through the root symlink, so it lands inside
/// the hardlink farm.
#[must_use]
pub struct SymlinkPackages<'a> {
    pub modules_dir: &'a Path,
    pub virtual_store_dir: &'a Path,
    pub plan: &'a [PlanEntry],
}

impl SymlinkPackages<'_> {
    /// Execute the subroutine.
    pub fn run(self) -> Result<(), LinkError> {
        let SymlinkPackages { modules_dir, virtual_store_dir, plan } = self;

        for entry in plan {
            let farm_dir = virtual_store_dir.join(entry.store_folder_name());
            let link = modules_dir.join(&entry.name);
            tracing::debug!(target: "yap::link", ?link, "Symlink package");
            force_symlink_dir(&farm_dir, &link).map_err(|error| LinkError::Symlink {
                from: farm_dir.clone(),
                to: link.clone(),
                error,
            })?;
        }

        for entry in plan {
            let original = modules_dir.join(&entry.name);
            let self_link = original.join("node_modules").join(&entry.name);
            force_symlink_dir(&original, &self_link).map_err(|error| LinkError::Symlink {
                from: original.clone(),
                to: self_link.clone(),
                error,
            })?;
        }

        Ok(())
    }
}
