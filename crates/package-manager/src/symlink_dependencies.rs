use crate::LinkError;
use std::{collections::HashSet, path::Path};
use yap_fs::force_symlink_dir;
use yap_lockfile::PlanEntry;

/// Expose each planned package's dependencies through its nested
/// `node_modules`, one symlink per declared dependency. The links are
/// written through the root symlink into the hardlink farm, which is where
/// the JavaScript module resolver searches.
///
/// Declared dependencies without a plan entry (skipped specifiers such as
/// `git:`) get no symlink rather than a dangling one.
#[must_use]
pub struct SymlinkDependencies<'a> {
    pub modules_dir: &'a Path,
    pub plan: &'a [PlanEntry],
}

impl SymlinkDependencies<'_> {
    /// Execute the subroutine.
    pub fn run(self) -> Result<(), LinkError> {
        let SymlinkDependencies { modules_dir, plan } = self;
        let planned: HashSet<&str> = plan.iter().map(|entry| entry.name.as_str()).collect();

        for entry in plan {
            for dependency in entry.dependencies.keys() {
                if !planned.contains(dependency.as_str()) {
                    tracing::debug!(
                        target: "yap::link",
                        package = %entry.name,
                        dependency = %dependency,
                        "Not in the plan, skipping symlink",
                    );
                    continue;
                }
                let original = modules_dir.join(dependency);
                let link =
                    modules_dir.join(&entry.name).join("node_modules").join(dependency);
                force_symlink_dir(&original, &link).map_err(|error| LinkError::Symlink {
                    from: original.clone(),
                    to: link.clone(),
                    error,
                })?;
            }
        }
        Ok(())
    }
}
