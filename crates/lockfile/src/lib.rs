mod load_save;
mod plan_entry;

pub use load_save::{LoadLockfileError, SaveLockfileError};
pub use plan_entry::PlanEntry;

use serde::{Deserialize, Serialize};

/// Serialized install plan, used to skip resolution on re-runs.
///
/// This is a local resumption cache, not a portable artifact: the entry
/// order is the resolver's post-order and must be preserved.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockfile {
    pub lockfile_version: u32,
    pub packages: Vec<PlanEntry>,
}

impl Lockfile {
    /// Base file name of the lockfile.
    pub const FILE_NAME: &'static str = "yap.lock";

    /// Version of the on-disk format.
    pub const VERSION: u32 = 1;

    pub fn new(packages: Vec<PlanEntry>) -> Self {
        Lockfile { lockfile_version: Lockfile::VERSION, packages }
    }
}
