use async_recursion::async_recursion;
use dashmap::DashSet;
use derive_more::{Display, Error};
use futures_util::future;
use miette::Diagnostic;
use split_first_char::SplitFirstChar;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};
use yap_lockfile::PlanEntry;
use yap_network::ThrottledClient;
use yap_npmrc::Npmrc;
use yap_registry::{FetchPackageDocumentError, MetadataCache, PackageDocument};
use yap_semver::{Version, VersionRange};

/// Names that have entered resolution. The single atomic check-and-insert
/// on this set is what makes resolution at-most-once per name: the first
/// specifier encountered for a name wins.
pub type SeenPackages = DashSet<String>;

/// The ordered install plan. Every dependency's entry precedes its
/// dependents' (post-order of the traversal).
pub type InstallPlan = Vec<PlanEntry>;

/// This subroutine walks the dependency graph from the root dependency
/// mapping and produces the install plan.
///
/// Every dependency expands as its own future; a parent awaits all of its
/// children before appending its own entry. Futures never occupy an OS
/// worker while waiting, so recursion depth cannot starve the pool; the
/// HTTP request limit is enforced separately by the throttled client.
#[must_use]
pub struct ResolveDependencies<'a> {
    pub http_client: &'a ThrottledClient,
    pub config: &'static Npmrc,
    pub meta_cache: &'a MetadataCache,
    pub seen: &'a SeenPackages,
}

/// Error type of [`ResolveDependencies`]. Any of these aborts the run; no
/// partial plan is persisted.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum ResolveError {
    #[diagnostic(transparent)]
    FetchMetadata(#[error(source)] FetchPackageDocumentError),

    #[display("no version of {name} satisfies {specifier:?}")]
    #[diagnostic(code(yap_package_manager::no_matching_version))]
    NoMatchingVersion { name: String, specifier: String },

    #[display("{name}@{version} is missing from the versions of its own registry document")]
    #[diagnostic(code(yap_package_manager::missing_version_metadata))]
    MissingVersionMetadata { name: String, version: Version },
}

impl<'a> ResolveDependencies<'a> {
    /// Execute the subroutine.
    pub async fn run(
        self,
        root_dependencies: HashMap<&str, &str>,
    ) -> Result<InstallPlan, ResolveError> {
        let plan = Mutex::new(InstallPlan::new());
        let tasks = root_dependencies
            .iter()
            .map(|(name, specifier)| self.resolve_package(name, specifier, &plan));
        future::try_join_all(tasks).await?;
        Ok(plan.into_inner().expect("no resolution task is left holding the plan lock"))
    }

    /// Resolve one `(name, specifier)` pair, recurse into the dependencies
    /// of the chosen version, then append the plan entry.
    #[async_recursion]
    async fn resolve_package(
        &self,
        name: &str,
        specifier: &str,
        plan: &Mutex<InstallPlan>,
    ) -> Result<(), ResolveError> {
        if !self.seen.insert(name.to_string()) {
            tracing::debug!(target: "yap::resolve", name, "Already seen");
            return Ok(());
        }

        if specifier.starts_with("git+") || specifier.starts_with("git:") {
            tracing::warn!(target: "yap::resolve", name, specifier, "Skipping git specifier");
            return Ok(());
        }

        if let Some(alias) = specifier.strip_prefix("npm:") {
            let (aliased_name, aliased_specifier) = split_npm_alias(alias);
            tracing::debug!(target: "yap::resolve", name, aliased_name, "Following npm alias");
            return self.resolve_package(aliased_name, aliased_specifier, plan).await;
        }

        let document =
            PackageDocument::fetch_cached(name, self.http_client, self.config, self.meta_cache)
                .await
                .map_err(ResolveError::FetchMetadata)?;

        // An empty specifier and `*` parse to the universal range; anything
        // that fails to parse (`file:`, URLs, tags) is skipped, not fatal.
        let Ok(range) = specifier.parse::<VersionRange>() else {
            tracing::warn!(target: "yap::resolve", name, specifier, "Skipping unsupported specifier");
            return Ok(());
        };

        // Highest satisfying version wins; `dist-tags.latest` is a mutable
        // tag and is deliberately not consulted.
        let available: Vec<Version> =
            document.versions.keys().filter_map(|key| key.parse().ok()).collect();
        let Some(version) = range.select(&available).cloned() else {
            return Err(ResolveError::NoMatchingVersion {
                name: name.to_string(),
                specifier: specifier.to_string(),
            });
        };
        let metadata = document.versions.get(&version.to_string()).ok_or_else(|| {
            ResolveError::MissingVersionMetadata { name: name.to_string(), version: version.clone() }
        })?;

        tracing::info!(target: "yap::resolve", name, %version, "Resolved");

        let dependencies: BTreeMap<String, String> = metadata
            .dependencies
            .iter()
            .map(|(dep_name, dep_specifier)| (dep_name.clone(), dep_specifier.clone()))
            .collect();

        let tasks = dependencies
            .iter()
            .map(|(dep_name, dep_specifier)| self.resolve_package(dep_name, dep_specifier, plan));
        future::try_join_all(tasks).await?;

        let entry = PlanEntry {
            name: name.to_string(),
            version,
            tarball: metadata.dist.tarball.clone(),
            dependencies,
        };
        plan.lock().expect("another resolution task panicked with the plan lock").push(entry);
        Ok(())
    }
}

/// Split the remainder of an `npm:` alias specifier into its target name
/// and version specifier. Scoped targets keep their leading `@`; a missing
/// version specifier means "any".
fn split_npm_alias(alias: &str) -> (&str, &str) {
    match alias.split_first_char() {
        Some(('@', tail)) => match tail.split_once('@') {
            Some((name, specifier)) => (&alias[..name.len() + 1], specifier),
            None => (alias, ""),
        },
        _ => alias.split_once('@').unwrap_or((alias, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_unscoped_npm_alias() {
        assert_eq!(split_npm_alias("chalk@^5.0.0"), ("chalk", "^5.0.0"));
        assert_eq!(split_npm_alias("chalk"), ("chalk", ""));
    }

    #[test]
    fn split_scoped_npm_alias() {
        assert_eq!(split_npm_alias("@scope/name@1.2.3"), ("@scope/name", "1.2.3"));
        assert_eq!(split_npm_alias("@scope/name"), ("@scope/name", ""));
    }
}
