use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CachePolicy;

pub(crate) const ENV_CACHE_POLICY: &str = "BANKFEED_CACHE_POLICY";
pub(crate) const ENV_CACHE_BACKEND: &str = "BANKFEED_CACHE_BACKEND";
pub(crate) const ENV_DATA_DIR: &str = "BANKFEED_DATA_DIR";
pub(crate) const ENV_DB_PATH: &str = "BANKFEED_DB_PATH";
pub(crate) const ENV_API_URL: &str = "BANKFEED_API_URL";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Could not find bank credentials in environment (missing: {})", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Could not find certificate via environment variable on '{}'", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("BANKFEED_API_URL is not set; pass --from <dir> to import a saved feed instead")]
    MissingApiUrl,

    #[error("Unknown cache backend '{0}' (expected 'sqlite' or 'memory')")]
    UnknownCacheBackend(String),

    #[error("Could not determine data directory")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheBackend {
    Sqlite,
    Memory,
}

impl CacheBackend {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownCacheBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) cache_policy: CachePolicy,
    pub(crate) cache_backend: CacheBackend,
    pub(crate) api_url: Option<String>,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source. Unset and empty
    /// values fall back to defaults.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match get(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => directories::ProjectDirs::from("com", "bankfeed", "bankfeed")
                .ok_or(ConfigError::NoDataDir)?
                .data_dir()
                .to_path_buf(),
        };
        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("bankfeed.db"));
        let cache_policy = get(ENV_CACHE_POLICY)
            .map(|p| CachePolicy::parse(&p))
            .unwrap_or_default();
        let cache_backend = match get(ENV_CACHE_BACKEND) {
            Some(b) => CacheBackend::parse(&b)?,
            None => CacheBackend::Sqlite,
        };

        Ok(Self {
            data_dir,
            db_path,
            cache_policy,
            cache_backend,
            api_url: get(ENV_API_URL),
        })
    }

    pub(crate) fn cache_path(&self) -> PathBuf {
        self.data_dir.join("cache.db")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("bankfeed.log")
    }
}
