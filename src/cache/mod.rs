mod memory;
mod sqlite;

use anyhow::Result;
use chrono::Duration;

use crate::config::{CacheBackend, Config};

pub(crate) use memory::MemoryCache;
pub(crate) use sqlite::SqliteCache;

pub(crate) const FEED_TTL_SECS: i64 = 60 * 60 * 2; // 2 hours

/// How long a fetched feed stays cached.
pub(crate) fn feed_ttl() -> Duration {
    Duration::seconds(FEED_TTL_SECS)
}

/// Key/value store with per-entry expiry, holding JSON blobs of raw feeds.
pub(crate) trait Cache {
    /// Returns the live value for `key`, or `None` when absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    fn expire(&self, key: &str) -> Result<()>;
}

/// Open the backend selected in the configuration.
pub(crate) fn open_cache(config: &Config) -> Result<Box<dyn Cache>> {
    match config.cache_backend {
        CacheBackend::Sqlite => Ok(Box::new(SqliteCache::open(&config.cache_path())?)),
        CacheBackend::Memory => Ok(Box::new(MemoryCache::new())),
    }
}

/// Whether a fetch may read from and/or write to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CachePolicy {
    #[default]
    ReadWrite,
    ReadOnly,
    WriteOnly,
    Bypass,
}

impl CachePolicy {
    /// Accepts the spelled-out names, or any string where `pull` enables
    /// reads and `push` enables writes (`push-pull`, `pull`, `ignore`, ...).
    pub(crate) fn parse(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "read-and-write" | "read-write" => return Self::ReadWrite,
            "read-only" => return Self::ReadOnly,
            "write-only" => return Self::WriteOnly,
            "bypass" => return Self::Bypass,
            _ => {}
        }
        match (lower.contains("pull"), lower.contains("push")) {
            (true, true) => Self::ReadWrite,
            (true, false) => Self::ReadOnly,
            (false, true) => Self::WriteOnly,
            (false, false) => Self::Bypass,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::ReadWrite => "read-and-write",
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
            Self::Bypass => "bypass",
        }
    }

    pub(crate) fn reads(&self) -> bool {
        matches!(self, Self::ReadWrite | Self::ReadOnly)
    }

    pub(crate) fn writes(&self) -> bool {
        matches!(self, Self::ReadWrite | Self::WriteOnly)
    }
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
