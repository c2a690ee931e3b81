use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default lifetime of a cached registry response in seconds (5 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Timeout for registry requests in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Registry defaults
// =============================================================================

/// Default endpoint answering version queries
pub const DEFAULT_PACKAGE_ENDPOINT: &str = "http://wordpresss-updater.local/api/package";

/// Default endpoint answering "view details" queries
pub const DEFAULT_DETAIL_ENDPOINT: &str = "http://wordpresss-updater.local/api/detail";

/// Default marker of the directory holding installed plugins
pub const DEFAULT_PLUGINS_ROOT: &str = "wp-content/plugins";

/// Default marker of the directory holding installed themes
pub const DEFAULT_THEMES_ROOT: &str = "wp-content/themes";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Update checker configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdaterConfig {
    pub registry: RegistryConfig,
    pub cache: CacheConfig,
    pub roots: RootsConfig,
}

impl UpdaterConfig {
    /// Load configuration from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Remote registry configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub package_endpoint: String,
    pub detail_endpoint: String,
    /// Site address appended to the User-Agent header
    pub site_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            package_endpoint: DEFAULT_PACKAGE_ENDPOINT.to_string(),
            detail_endpoint: DEFAULT_DETAIL_ENDPOINT.to_string(),
            site_url: None,
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Storage used for cached registry responses
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Lifetime of a cached response in seconds
    pub ttl_secs: u64,
    pub backend: CacheBackend,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            backend: CacheBackend::default(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Install locations used to tell plugins from themes
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RootsConfig {
    pub plugins: String,
    pub themes: String,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            plugins: DEFAULT_PLUGINS_ROOT.to_string(),
            themes: DEFAULT_THEMES_ROOT.to_string(),
        }
    }
}

/// Returns the path to the data directory for update-checker.
/// Uses $XDG_DATA_HOME/update-checker if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/update-checker,
/// or ./update-checker if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the response cache database.
pub fn db_path() -> PathBuf {
    data_dir().join("responses.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("update-checker.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("update-checker")
}
