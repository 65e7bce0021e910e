use anyhow::{Context, Result};

use super::{Feed, RawRecord, StatementSource};
use crate::cache::{feed_ttl, Cache, CachePolicy};

/// Get the raw records of `feed`, serving them from `cache` when the policy
/// allows reads and storing fresh upstream results when it allows writes.
///
/// Upstream errors are returned as-is; nothing is cached on failure. A
/// cached value that does not decode is an error and is expired when the
/// policy allows writes.
pub(crate) fn fetch_raw(
    feed: Feed,
    source: &dyn StatementSource,
    cache: &dyn Cache,
    policy: CachePolicy,
) -> Result<Vec<RawRecord>> {
    let key = feed.cache_key();
    tracing::info!(%feed, cache_policy = %policy, "Starting to get raw statements");

    if policy.reads() {
        if let Some(blob) = cache.get(key)? {
            tracing::info!(key, "Cache hit");
            return match serde_json::from_str::<Vec<RawRecord>>(&blob) {
                Ok(raw) => Ok(raw),
                Err(e) => {
                    // Still fatal for this run, but the next one refetches
                    if policy.writes() {
                        tracing::warn!(key, "Expiring undecodable cache entry");
                        cache.expire(key)?;
                    }
                    Err(e).with_context(|| format!("Cached value for '{key}' is not a JSON list"))
                }
            };
        }
    }

    let raw = source.fetch(feed)?;

    if policy.writes() {
        tracing::info!(key, "Setting cache");
        cache.set(key, &serde_json::to_string(&raw)?, feed_ttl())?;
    }

    tracing::info!(%feed, statements_count = raw.len(), "Fetched raw statements");
    Ok(raw)
}
