mod account;
mod amount;
mod card;
mod feed;

pub(crate) use account::parse_account_statements;
pub(crate) use card::parse_card_statements;
pub(crate) use feed::normalize_account_feed;

use anyhow::Result;
use thiserror::Error;
use uuid::Uuid;

use crate::bank::{fetch_raw, Feed, StatementSource};
use crate::cache::{Cache, CachePolicy};
use crate::db::Database;
use crate::models::ValidationError;

/// Why a single raw record was skipped.
#[derive(Debug, Error)]
pub(crate) enum RecordError {
    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl RecordError {
    pub(crate) fn field(field: &'static str, reason: String) -> Self {
        Self::Field { field, reason }
    }
}

pub(crate) fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, RecordError> {
    Uuid::parse_str(value).map_err(|e| RecordError::field(field, format!("'{value}': {e}")))
}

/// Counts for one import run of one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) raw: usize,
    pub(crate) parsed: usize,
    pub(crate) inserted: usize,
    pub(crate) already_existing: usize,
}

impl ImportSummary {
    pub(crate) fn skipped(&self) -> usize {
        self.raw.saturating_sub(self.parsed)
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new, {} already imported, {} skipped",
            self.inserted,
            self.already_existing,
            self.skipped()
        )
    }
}

/// Fetch, parse and persist the card statements feed.
pub(crate) fn import_card_statements(
    source: &dyn StatementSource,
    cache: &dyn Cache,
    policy: CachePolicy,
    db: &mut Database,
) -> Result<ImportSummary> {
    let raw = fetch_raw(Feed::CardStatements, source, cache, policy)?;
    let parsed = parse_card_statements(&raw);
    let outcome = db.insert_card_statements(&parsed)?;
    Ok(ImportSummary {
        raw: raw.len(),
        parsed: parsed.len(),
        inserted: outcome.inserted,
        already_existing: outcome.already_existing,
    })
}

/// Fetch, normalize, parse and persist the checking-account feed.
pub(crate) fn import_account_statements(
    source: &dyn StatementSource,
    cache: &dyn Cache,
    policy: CachePolicy,
    db: &mut Database,
) -> Result<ImportSummary> {
    let raw = normalize_account_feed(fetch_raw(Feed::AccountFeed, source, cache, policy)?);
    let parsed = parse_account_statements(&raw);
    let outcome = db.insert_account_statements(&parsed)?;
    Ok(ImportSummary {
        raw: raw.len(),
        parsed: parsed.len(),
        inserted: outcome.inserted,
        already_existing: outcome.already_existing,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
