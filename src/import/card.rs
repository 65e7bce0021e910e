use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::amount::cents_to_decimal;
use super::{parse_uuid, RecordError};
use crate::bank::RawRecord;
use crate::models::CardStatement;

/// Card transaction as the banking API returns it. Unused upstream keys
/// (`_links`, `href`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawCardStatement {
    id: String,
    #[serde(default)]
    account: Option<String>,
    amount: f64,
    #[serde(default)]
    amount_without_iof: Option<f64>,
    category: String,
    description: String,
    #[serde(default)]
    details: serde_json::Value,
    #[serde(default)]
    source: Option<String>,
    time: String,
    title: String,
    #[serde(default)]
    tokenized: Option<bool>,
}

/// Parse and validate raw card records, skipping (and logging) the bad ones.
/// Relative order of the good records is kept.
pub(crate) fn parse_card_statements(raw: &[RawRecord]) -> Vec<CardStatement> {
    tracing::info!(card_statements_count = raw.len(), "Starting parsing of card statements");

    let mut parsed = Vec::with_capacity(raw.len());
    for record in raw {
        match parse_card_statement(record) {
            Ok(statement) => parsed.push(statement),
            Err(e) => tracing::error!(error = %e, statement = %record, "Could not parse statement"),
        }
    }

    tracing::info!(parsed_card_statements_count = parsed.len(), "Parsed card statements");
    parsed
}

pub(crate) fn parse_card_statement(record: &RawRecord) -> Result<CardStatement, RecordError> {
    let raw = RawCardStatement::deserialize(record)?;

    let amount_without_tax = match raw.amount_without_iof {
        Some(cents) => Some(cents_to_decimal("amount_without_iof", cents)?),
        None => None,
    }
    .filter(|a| !a.is_zero());

    let statement = CardStatement {
        id: None,
        external_id: parse_uuid("id", &raw.id)?,
        account: raw
            .account
            .as_deref()
            .filter(|a| !a.is_empty())
            .map(|a| parse_uuid("account", a))
            .transpose()?,
        amount: cents_to_decimal("amount", raw.amount)?,
        amount_without_tax,
        category: raw.category,
        description: raw.description,
        details: raw.details,
        source: raw.source,
        time: parse_time(&raw.time)?,
        title: raw.title,
        tokenized: raw.tokenized,
    };
    statement.validate()?;
    Ok(statement)
}

/// RFC 3339, or a bare ISO timestamp taken as UTC.
fn parse_time(value: &str) -> Result<DateTime<Utc>, RecordError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|t| t.and_utc())
        .map_err(|e| RecordError::field("time", format!("'{value}': {e}")))
}

#[cfg(test)]
#[path = "card_tests.rs"]
mod tests;
