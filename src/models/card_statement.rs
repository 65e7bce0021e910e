use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::validation::{check_amount, max_chars, require_text, ValidationError};

/// One credit-card transaction as delivered by the card statements feed.
///
/// Amounts are already converted from cents. `external_id` is the upstream
/// transaction id and is the deduplication key at import time.
#[derive(Debug, Clone, PartialEq)]
pub struct CardStatement {
    pub id: Option<i64>,
    pub external_id: Uuid,
    pub account: Option<Uuid>,
    pub amount: Decimal,
    /// Amount before the foreign-transaction tax, when the feed reports one.
    pub amount_without_tax: Option<Decimal>,
    pub category: String,
    pub description: String,
    pub details: serde_json::Value,
    pub source: Option<String>,
    pub time: DateTime<Utc>,
    pub title: String,
    pub tokenized: Option<bool>,
}

impl CardStatement {
    pub const CATEGORY_MAX_LEN: usize = 128;
    pub const SOURCE_MAX_LEN: usize = 64;
    pub const TITLE_MAX_LEN: usize = 128;

    /// Field-level checks: required text, column lengths, money precision
    /// and a non-empty details blob.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("amount", self.amount)?;
        if let Some(amount) = self.amount_without_tax {
            check_amount("amount_without_tax", amount)?;
        }
        require_text("category", &self.category)?;
        max_chars("category", &self.category, Self::CATEGORY_MAX_LEN)?;
        require_text("description", &self.description)?;
        if is_empty_json(&self.details) {
            return Err(ValidationError::Blank { field: "details" });
        }
        if let Some(source) = &self.source {
            max_chars("source", source, Self::SOURCE_MAX_LEN)?;
        }
        require_text("title", &self.title)?;
        max_chars("title", &self.title, Self::TITLE_MAX_LEN)?;
        Ok(())
    }
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

impl std::fmt::Display for CardStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) {}: R$ {:.2}",
            self.time.format("%d/%b/%Y"),
            self.description,
            self.amount
        )
    }
}
