//! Configuration for topicbase.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TOPICBASE_*, GITHUB_*)
//! 2. Config file (.topicbase/config.yaml)
//! 3. Defaults (filesystem backend rooted at the current directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .topicbase/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/topicbase/config.yaml)
//! - Paths in the config file are relative to the directory holding the
//!   config folder (the project root for .topicbase/)
//!
//! The GitHub token is only ever read from `GITHUB_TOKEN`.

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::{ContentStore, FsStore, GithubConfig, GithubStore};
use crate::core::{ContentGateway, NoCache, ReadCache, TopicRepository, TtlCache};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub fs: FsConfig,
    #[serde(default)]
    pub github: Option<GithubSection>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Logical prefix of all storage paths
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FsConfig {
    /// Directory holding the content root (relative to the project root)
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubSection {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub ttl_seconds: Option<u64>,
}

/// Which store documents live in
#[derive(Debug, Clone)]
pub enum Backend {
    /// Local directory
    Fs { dir: PathBuf },

    /// GitHub repository contents
    Github(GithubConfig),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Fs { .. } => "fs",
            Backend::Github(_) => "github",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: crate::core::cache::DEFAULT_TTL,
        }
    }
}

/// Resolved configuration with absolute paths and defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Backend,
    /// Logical prefix of storage paths (`content` by default)
    pub content_root: String,
    pub cache: CacheSettings,
    /// Per-call storage timeout
    pub request_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Instantiate the configured store
    pub fn build_store(&self) -> Result<Arc<dyn ContentStore>> {
        let store: Arc<dyn ContentStore> = match &self.backend {
            Backend::Fs { dir } => Arc::new(FsStore::new(dir.clone())),
            Backend::Github(github) => {
                if github.token.is_none() {
                    tracing::warn!("GITHUB_TOKEN is not set; writes to GitHub will be rejected");
                }
                Arc::new(GithubStore::new(github.clone()).context("Failed to set up GitHub store")?)
            }
        };
        Ok(store)
    }

    /// Instantiate the configured read cache
    pub fn build_cache(&self) -> Arc<dyn ReadCache> {
        if self.cache.enabled {
            Arc::new(TtlCache::new(self.cache.ttl))
        } else {
            Arc::new(NoCache)
        }
    }

    /// Wire a repository from this configuration
    pub fn build_repository(&self) -> Result<TopicRepository> {
        let gateway = ContentGateway::new(self.build_store()?, self.build_cache(), self.request_timeout);
        Ok(TopicRepository::new(gateway, self.content_root.clone()))
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".topicbase").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let user_config = dirs::config_dir()?.join("topicbase").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge config file contents and environment into a resolved config
fn resolve(
    file: ConfigFile,
    config_path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    // Base directory is the parent of .topicbase/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let backend_name = env("TOPICBASE_BACKEND")
        .or(file.backend)
        .unwrap_or_else(|| "fs".to_string());

    let backend = match backend_name.trim().to_lowercase().as_str() {
        "fs" | "local" | "filesystem" => {
            let dir = if let Some(env_dir) = env("TOPICBASE_DIR") {
                PathBuf::from(env_dir)
            } else if let Some(ref dir) = file.fs.dir {
                resolve_path(&base_dir, dir)
            } else {
                base_dir
            };
            Backend::Fs { dir }
        }
        "github" => {
            let section = file.github.unwrap_or_default();
            let owner = env("GITHUB_OWNER")
                .or(section.owner)
                .context("GitHub backend requires an owner (github.owner or GITHUB_OWNER)")?;
            let repo = env("GITHUB_REPO")
                .or(section.repo)
                .context("GitHub backend requires a repository (github.repo or GITHUB_REPO)")?;

            Backend::Github(GithubConfig {
                owner,
                repo,
                branch: env("GITHUB_BRANCH").or(section.branch),
                api_base: section
                    .api_base
                    .unwrap_or_else(|| crate::adapters::github::DEFAULT_API_BASE.to_string()),
                token: env("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()),
            })
        }
        other => anyhow::bail!("Unknown backend '{}' (expected fs or github)", other),
    };

    let content_root = env("TOPICBASE_CONTENT_ROOT")
        .or(file.content.root)
        .unwrap_or_else(|| paths::DEFAULT_CONTENT_ROOT.to_string());

    let cache_enabled = match env("TOPICBASE_CACHE") {
        Some(flag) => !matches!(flag.trim().to_lowercase().as_str(), "0" | "false" | "off" | "no"),
        None => file.cache.enabled.unwrap_or(true),
    };
    let cache = CacheSettings {
        enabled: cache_enabled,
        ttl: file
            .cache
            .ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(crate::core::cache::DEFAULT_TTL),
    };

    let timeout_seconds = match env("TOPICBASE_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid TOPICBASE_TIMEOUT_SECS value: {}", raw))?,
        None => file
            .request_timeout_seconds
            .unwrap_or(crate::core::gateway::DEFAULT_TIMEOUT.as_secs()),
    };

    Ok(ResolvedConfig {
        backend,
        content_root,
        cache,
        request_timeout: Duration::from_secs(timeout_seconds),
        config_file: config_path,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_path = find_config_file();
    let file = match config_path {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    resolve(file, config_path, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
