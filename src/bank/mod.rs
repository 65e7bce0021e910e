mod credentials;
mod export;
mod fetch;
mod http;

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, ConfigError};

pub(crate) use credentials::Credentials;
pub(crate) use export::ExportSource;
pub(crate) use fetch::fetch_raw;
pub(crate) use http::HttpSource;

/// A record exactly as the banking API returned it.
pub(crate) type RawRecord = serde_json::Value;

/// The two feeds the banking API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feed {
    CardStatements,
    AccountFeed,
}

impl Feed {
    pub(crate) fn cache_key(&self) -> &'static str {
        match self {
            Self::CardStatements => "card_statements.json",
            Self::AccountFeed => "account_feed.json",
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardStatements => write!(f, "card statements"),
            Self::AccountFeed => write!(f, "account feed"),
        }
    }
}

/// Upstream client for the banking API.
pub(crate) trait StatementSource {
    fn card_statements(&self) -> Result<Vec<RawRecord>>;
    fn account_feed(&self) -> Result<Vec<RawRecord>>;

    fn fetch(&self, feed: Feed) -> Result<Vec<RawRecord>> {
        match feed {
            Feed::CardStatements => self.card_statements(),
            Feed::AccountFeed => self.account_feed(),
        }
    }
}

/// Open a source: a saved export directory when given, otherwise the live
/// API with credentials from the environment.
pub(crate) fn connect(config: &Config, export_dir: Option<&Path>) -> Result<Box<dyn StatementSource>> {
    match export_dir {
        Some(dir) => Ok(Box::new(ExportSource::open(dir)?)),
        None => Ok(Box::new(live_source(config, |key| std::env::var(key).ok())?)),
    }
}

/// Credentials are checked before anything touches the network.
pub(crate) fn live_source(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<HttpSource> {
    let credentials = Credentials::from_lookup(lookup)?;
    let api_url = config.api_url.as_deref().ok_or(ConfigError::MissingApiUrl)?;
    HttpSource::new(api_url, &credentials)
}
