use pipe_trait::Pipe;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use yap_store_dir::StoreDir;

/// Configuration gathered from `.npmrc` files and defaults.
///
/// `~/.npmrc` is applied first, then the project's `.npmrc`, so project
/// settings win.
#[derive(Debug, Clone, PartialEq)]
pub struct Npmrc {
    /// Base URL of the npm registry, trailing slash included.
    pub registry: String,
    /// Bearer token sent with every registry and tarball request.
    pub auth_token: Option<String>,
    /// Location of extracted packages and the metadata cache.
    pub store_dir: StoreDir,
    /// The directory in which dependencies will be installed.
    pub modules_dir: PathBuf,
    /// The directory with hardlink farms that `modules_dir` symlinks into.
    pub virtual_store_dir: PathBuf,
    /// Remaining `key=value` settings, kept verbatim.
    pub settings: HashMap<String, String>,
}

impl Npmrc {
    /// Default configuration rooted at `project_dir`, no `.npmrc` applied.
    pub fn with_project_dir(project_dir: &Path) -> Self {
        let modules_dir = project_dir.join("node_modules");
        Npmrc {
            registry: "https://registry.npmjs.org/".to_string(),
            auth_token: None,
            store_dir: project_dir.join(".yap_store").pipe(StoreDir::new),
            virtual_store_dir: modules_dir.join(".yap"),
            modules_dir,
            settings: HashMap::new(),
        }
    }

    /// Load configuration for `project_dir`, applying `{home_dir}/.npmrc`
    /// (if any) then `{project_dir}/.npmrc` (if any).
    pub fn load(project_dir: &Path, home_dir: Option<PathBuf>) -> Self {
        let mut config = Npmrc::with_project_dir(project_dir);
        if let Some(home_dir) = home_dir {
            config.apply_file(&home_dir.join(".npmrc"));
        }
        config.apply_file(&project_dir.join(".npmrc"));
        if !config.registry.ends_with('/') {
            config.registry.push('/');
        }
        config
    }

    /// Load configuration for `project_dir` with the user's home directory.
    pub fn current(project_dir: &Path) -> Self {
        Npmrc::load(project_dir, home::home_dir())
    }

    /// Persist the config data until the program terminates.
    pub fn leak(self) -> &'static Self {
        self.pipe(Box::new).pipe(Box::leak)
    }

    fn apply_file(&mut self, path: &Path) {
        let Ok(content) = fs::read_to_string(path) else { return };
        tracing::debug!(target: "yap::config", ?path, "Applying npmrc");
        for line in content.lines() {
            self.apply_line(line);
        }
    }

    /// * Lines starting with `//` carry the registry host and auth token:
    ///   the part before the first `:` (with `https:` prepended) becomes the
    ///   registry, the `=`-delimited remainder yields the token.
    /// * Every other line is a plain `key=value` setting; `registry` is
    ///   recognized, the rest are kept as-is.
    fn apply_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return;
        }
        if line.starts_with("//") {
            let Some((host, auth)) = line.split_once(':') else { return };
            self.registry = format!("https:{host}");
            if let Some((_, token)) = auth.split_once('=') {
                self.auth_token = Some(token.trim().to_string());
            }
        } else if let Some((key, value)) = line.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            if key == "registry" {
                self.registry = value.to_string();
            } else {
                self.settings.insert(key.to_string(), value.to_string());
            }
        }
    }
}
