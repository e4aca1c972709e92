
use _utils::{leaked_config, registry_document};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use tempfile::tempdir;
use yap_network::ThrottledClient;
use yap_package_manager::{ResolveDependencies, ResolveError, SeenPackages};
use yap_registry::MetadataCache;

struct Fixture {
    server: mockito::ServerGuard,
    _project_dir: tempfile::TempDir,
    _cache_dir: tempfile::TempDir,
    config: &'static yap_npmrc::Npmrc,
    meta_cache: MetadataCache,
}

impl Fixture {
    async fn new() -> Self {
        let server = mockito::Server::new_async().await;
        let project_dir = tempdir().unwrap();
        let cache_dir = tempdir().unwrap();
        let config = leaked_config(project_dir.path(), &server.url());
        let meta_cache = MetadataCache::new(cache_dir.path());
        Fixture { server, _project_dir: project_dir, _cache_dir: cache_dir, config, meta_cache }
    }

    async fn mock_package(&mut self, name: &str, latest: &str, versions: &[(&str, &[(&str, &str)])]) {
        let versions: Vec<(&str, String, &[(&str, &str)])> = versions
            .iter()
            .map(|(version, dependencies)| {
                (*version, format!("{0}/{name}-{version}.tgz", self.server.url()), *dependencies)
            })
            .collect();
        let versions: Vec<(&str, &str, &[(&str, &str)])> = versions
            .iter()
            .map(|(version, tarball, dependencies)| (*version, tarball.as_str(), *dependencies))
            .collect();
        let document = registry_document(name, latest, &versions);
        self.server
            .mock("GET", format!("/{name}").as_str())
            .with_status(200)
            .with_body(document)
            .create_async()
            .await;
    }

    async fn resolve(
        &self,
        roots: HashMap<&str, &str>,
    ) -> Result<Vec<yap_lockfile::PlanEntry>, ResolveError> {
        ResolveDependencies {
            http_client: &ThrottledClient::default(),
            config: self.config,
            meta_cache: &self.meta_cache,
            seen: &SeenPackages::new(),
        }
        .run(roots)
        .await
    }
}

#[tokio::test]
async fn single_package_resolves_to_the_highest_satisfying_version() {
    let mut fixture = Fixture::new().await;
    fixture
        .mock_package(
            "chalk",
            "5.2.0",
            &[("5.0.0", &[]), ("5.1.0", &[]), ("5.2.0", &[]), ("6.0.0", &[])],
        )
        .await;

    let plan = fixture.resolve(HashMap::from([("chalk", "^5.0.0")])).await.unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].name, "chalk");
    assert_eq!(plan[0].version.to_string(), "5.2.0");
    assert!(plan[0].tarball.ends_with("/chalk-5.2.0.tgz"));
}

#[tokio::test]
async fn dependencies_appear_before_their_dependents() {
    let mut fixture = Fixture::new().await;
    fixture.mock_package("a", "1.0.0", &[("1.0.0", &[("b", "^1")])]).await;
    fixture.mock_package("b", "1.1.0", &[("1.0.0", &[]), ("1.1.0", &[])]).await;

    let plan = fixture.resolve(HashMap::from([("a", "1.0.0")])).await.unwrap();

    let names: Vec<&str> = plan.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(plan[0].version.to_string(), "1.1.0");
    assert_eq!(plan[1].dependencies["b"], "^1");
}

#[tokio::test]
async fn the_first_specifier_encountered_for_a_name_wins() {
    let mut fixture = Fixture::new().await;
    fixture.mock_package("x", "1.0.0", &[("1.0.0", &[("shared", "^1.0.0")])]).await;
    fixture.mock_package("y", "1.0.0", &[("1.0.0", &[("shared", "^1.2.0")])]).await;
    fixture
        .mock_package("shared", "1.3.0", &[("1.0.0", &[]), ("1.2.0", &[]), ("1.3.0", &[])])
        .await;

    let plan = fixture
        .resolve(HashMap::from([("x", "1.0.0"), ("y", "1.0.0")]))
        .await
        .unwrap();

    let shared: Vec<_> = plan.iter().filter(|entry| entry.name == "shared").collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].version.to_string(), "1.3.0");
    assert_eq!(plan.len(), 3);
}

#[tokio::test]
async fn git_specifiers_are_skipped_without_failing_the_run() {
    let fixture = Fixture::new().await;
    // No registry document is mocked: the resolver must not even fetch.
    let plan = fixture
        .resolve(HashMap::from([("g", "git+https://example.com/g.git")]))
        .await
        .unwrap();
    assert_eq!(plan, []);
}

#[tokio::test]
async fn unsupported_specifiers_are_skipped_without_failing_the_run() {
    let mut fixture = Fixture::new().await;
    fixture.mock_package("weird", "1.0.0", &[("1.0.0", &[])]).await;
    let plan = fixture.resolve(HashMap::from([("weird", "file:../weird")])).await.unwrap();
    assert_eq!(plan, []);
}

#[tokio::test]
async fn npm_aliases_resolve_their_target() {
    let mut fixture = Fixture::new().await;
    fixture.mock_package("chalk", "5.2.0", &[("5.0.0", &[]), ("5.2.0", &[])]).await;

    let plan = fixture
        .resolve(HashMap::from([("my-chalk", "npm:chalk@^5.0.0")]))
        .await
        .unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].name, "chalk");
    assert_eq!(plan[0].version.to_string(), "5.2.0");
}

#[tokio::test]
async fn wildcard_resolves_to_semver_max_not_the_latest_tag() {
    let mut fixture = Fixture::new().await;
    // `latest` deliberately points at an older release.
    fixture.mock_package("pinned", "1.0.0", &[("1.0.0", &[]), ("2.0.0", &[])]).await;

    let plan = fixture.resolve(HashMap::from([("pinned", "*")])).await.unwrap();
    assert_eq!(plan[0].version.to_string(), "2.0.0");

    // The empty specifier behaves like `*`.
    let plan = fixture.resolve(HashMap::from([("pinned", "")])).await.unwrap();
    assert_eq!(plan[0].version.to_string(), "2.0.0");
}

#[tokio::test]
async fn disjunction_selects_across_both_arms() {
    let mut fixture = Fixture::new().await;
    fixture
        .mock_package(
            "multi",
            "3.0.0",
            &[("0.9.0", &[]), ("1.5.0", &[]), ("2.1.0", &[]), ("3.0.0", &[])],
        )
        .await;

    let plan = fixture.resolve(HashMap::from([("multi", "1.x || 2.x")])).await.unwrap();
    assert_eq!(plan[0].version.to_string(), "2.1.0");
}

#[tokio::test]
async fn no_matching_version_aborts_the_run() {
    let mut fixture = Fixture::new().await;
    fixture.mock_package("chalk", "5.2.0", &[("5.0.0", &[]), ("5.2.0", &[])]).await;

    let error = fixture.resolve(HashMap::from([("chalk", "^9.0.0")])).await.unwrap_err();
    assert!(matches!(error, ResolveError::NoMatchingVersion { .. }));
}
