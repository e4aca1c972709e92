use crate::LinkError;
use std::{fs, path::Path};
use walkdir::WalkDir;
use yap_fs::force_hardlink_file;
use yap_lockfile::PlanEntry;
use yap_store_dir::StoreDir;

/// Mirror every planned package from the store into the virtual store
/// `node_modules/.yap/{escape(name)}@{version}`, hardlinking files so both
/// trees share inodes. Replaces existing destination files, so re-runs are
/// idempotent.
#[must_use]
pub struct CreateVirtualStore<'a> {
    pub store_dir: &'a StoreDir,
    pub virtual_store_dir: &'a Path,
    pub plan: &'a [PlanEntry],
}

impl CreateVirtualStore<'_> {
    /// Execute the subroutine.
    pub fn run(self) -> Result<(), LinkError> {
        let CreateVirtualStore { store_dir, virtual_store_dir, plan } = self;
        for entry in plan {
            let source_dir = store_dir.package_dir(&entry.name, &entry.version);
            if !source_dir.is_dir() {
                return Err(LinkError::PackageNotFound { name: entry.name.clone() });
            }
            let farm_dir = virtual_store_dir.join(entry.store_folder_name());
            tracing::debug!(target: "yap::link", ?farm_dir, "Hardlink package");
            hardlink_tree(&source_dir, &farm_dir)?;
        }
        Ok(())
    }
}

fn hardlink_tree(source_dir: &Path, farm_dir: &Path) -> Result<(), LinkError> {
    for walked in WalkDir::new(source_dir) {
        let walked = walked
            .map_err(|error| LinkError::Walk { path: source_dir.to_path_buf(), error })?;
        let relative =
            walked.path().strip_prefix(source_dir).expect("walked path is under its own root");
        let target = farm_dir.join(relative);
        if walked.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|error| LinkError::CreateDir { path: target.clone(), error })?;
        } else {
            force_hardlink_file(walked.path(), &target).map_err(|error| LinkError::Hardlink {
                from: walked.path().to_path_buf(),
                to: target.clone(),
                error,
            })?;
        }
    }
    Ok(())
}
