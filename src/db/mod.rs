mod csv_export;
mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{AccountStatement, CardStatement, EventKind};

const CARD_COLUMNS: &str = "id, external_id, account, amount, amount_without_tax, category,
     description, details, source, time, title, tokenized";

const ACCOUNT_COLUMNS: &str = "id, external_id, destination_account, origin_account, amount,
     detail, post_date, title, kind";

/// How a batch insert went: new rows versus external ids already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PersistOutcome {
    pub(crate) inserted: usize,
    pub(crate) already_existing: usize,
}

impl PersistOutcome {
    fn record(&mut self, changed_rows: usize) {
        if changed_rows == 0 {
            self.already_existing += 1;
        } else {
            self.inserted += 1;
        }
    }
}

/// Browse filters. Dates are inclusive. `title` and `source` only apply to
/// card statements, `kind` only to account statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatementFilter {
    pub(crate) search: Option<String>,
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
    pub(crate) title: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) kind: Option<EventKind>,
    pub(crate) limit: Option<u32>,
}

impl StatementFilter {
    pub(crate) fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.title.is_none()
            && self.source.is_none()
            && self.kind.is_none()
    }
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Card statements ───────────────────────────────────────

    /// Insert the whole batch in one transaction. A statement whose
    /// external id is already stored counts as already existing.
    pub(crate) fn insert_card_statements(
        &mut self,
        statements: &[CardStatement],
    ) -> Result<PersistOutcome> {
        let tx = self.conn.transaction()?;
        let mut outcome = PersistOutcome::default();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO card_statements (external_id, account, amount, amount_without_tax,
                     category, description, details, source, time, title, tokenized)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(external_id) DO NOTHING",
            )?;
            for s in statements {
                let changed = stmt
                    .execute(params![
                        s.external_id.to_string(),
                        s.account.map(|a| a.to_string()),
                        money(&s.amount),
                        s.amount_without_tax.as_ref().map(money),
                        s.category,
                        s.description,
                        s.details.to_string(),
                        s.source,
                        timestamp(&s.time),
                        s.title,
                        s.tokenized,
                    ])
                    .with_context(|| format!("Failed to store card statement {}", s.external_id))?;
                outcome.record(changed);
            }
        }
        tx.commit()?;

        tracing::info!(
            inserted = outcome.inserted,
            already_existing = outcome.already_existing,
            "Saved card statements"
        );
        Ok(outcome)
    }

    /// Newest first.
    pub(crate) fn get_card_statements(&self, filter: &StatementFilter) -> Result<Vec<CardStatement>> {
        let mut sql = format!("SELECT {CARD_COLUMNS} FROM card_statements WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(s) = &filter.search {
            sql.push_str(&format!(
                " AND (amount LIKE ?{0} ESCAPE '\\' OR description LIKE ?{0} ESCAPE '\\'
                   OR title LIKE ?{0} ESCAPE '\\')",
                bind(&mut param_values, like_pattern(s))
            ));
        }
        if let Some(title) = &filter.title {
            sql.push_str(&format!(
                " AND title = ?{} COLLATE NOCASE",
                bind(&mut param_values, title.clone())
            ));
        }
        if let Some(source) = &filter.source {
            sql.push_str(&format!(
                " AND source = ?{} COLLATE NOCASE",
                bind(&mut param_values, source.clone())
            ));
        }
        if let Some(since) = filter.since {
            sql.push_str(&format!(
                " AND time >= ?{}",
                bind(&mut param_values, since.to_string())
            ));
        }
        // Timestamps sort after their bare date, so compare with the next day.
        if let Some(next_day) = filter.until.and_then(|d| d.succ_opt()) {
            sql.push_str(&format!(
                " AND time < ?{}",
                bind(&mut param_values, next_day.to_string())
            ));
        }

        sql.push_str(" ORDER BY time DESC, id DESC");
        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), card_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_card_statement_by_id(&self, id: i64) -> Result<Option<CardStatement>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM card_statements WHERE id = ?1"),
                params![id],
                card_from_row,
            )
            .optional()?)
    }

    pub(crate) fn card_statement_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM card_statements", [], |row| row.get(0))?)
    }

    // ── Account statements ────────────────────────────────────

    /// Same contract as [`Database::insert_card_statements`].
    pub(crate) fn insert_account_statements(
        &mut self,
        statements: &[AccountStatement],
    ) -> Result<PersistOutcome> {
        let tx = self.conn.transaction()?;
        let mut outcome = PersistOutcome::default();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO account_statements (external_id, destination_account, origin_account,
                     amount, detail, post_date, title, kind)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(external_id) DO NOTHING",
            )?;
            for s in statements {
                let changed = stmt
                    .execute(params![
                        s.external_id.to_string(),
                        s.destination_account,
                        s.origin_account,
                        money(&s.amount),
                        s.detail,
                        s.post_date.to_string(),
                        s.title,
                        s.kind.as_str(),
                    ])
                    .with_context(|| {
                        format!("Failed to store account statement {}", s.external_id)
                    })?;
                outcome.record(changed);
            }
        }
        tx.commit()?;

        tracing::info!(
            inserted = outcome.inserted,
            already_existing = outcome.already_existing,
            "Saved account statements"
        );
        Ok(outcome)
    }

    /// Most recent post date first.
    pub(crate) fn get_account_statements(
        &self,
        filter: &StatementFilter,
    ) -> Result<Vec<AccountStatement>> {
        let mut sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account_statements WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(s) = &filter.search {
            sql.push_str(&format!(
                " AND (external_id LIKE ?{0} ESCAPE '\\' OR title LIKE ?{0} ESCAPE '\\'
                   OR amount LIKE ?{0} ESCAPE '\\' OR origin_account LIKE ?{0} ESCAPE '\\'
                   OR destination_account LIKE ?{0} ESCAPE '\\' OR detail LIKE ?{0} ESCAPE '\\')",
                bind(&mut param_values, like_pattern(s))
            ));
        }
        if let Some(since) = filter.since {
            sql.push_str(&format!(
                " AND post_date >= ?{}",
                bind(&mut param_values, since.to_string())
            ));
        }
        if let Some(until) = filter.until {
            sql.push_str(&format!(
                " AND post_date <= ?{}",
                bind(&mut param_values, until.to_string())
            ));
        }
        if let Some(kind) = filter.kind {
            sql.push_str(&format!(" AND kind = ?{}", bind(&mut param_values, kind.as_str())));
        }

        sql.push_str(" ORDER BY post_date DESC, id DESC");
        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), account_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_account_statement_by_id(&self, id: i64) -> Result<Option<AccountStatement>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM account_statements WHERE id = ?1"),
                params![id],
                account_from_row,
            )
            .optional()?)
    }

    pub(crate) fn account_statement_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM account_statements", [], |row| {
                row.get(0)
            })?)
    }
}

// ── Row mapping ───────────────────────────────────────────────

/// Push a bound parameter and return its 1-based position.
fn bind(params: &mut Vec<Box<dyn ToSql>>, value: impl ToSql + 'static) -> usize {
    params.push(Box::new(value));
    params.len()
}

/// Substring pattern for `LIKE ... ESCAPE '\'`; user `%` and `_` match
/// literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn money(amount: &Decimal) -> String {
    format!("{amount:.2}")
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a TEXT column through `FromStr`, reporting bad values as conversion
/// failures on that column.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => parse_column(row, idx).map(Some),
        None => Ok(None),
    }
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<CardStatement> {
    Ok(CardStatement {
        id: Some(row.get(0)?),
        external_id: parse_column(row, 1)?,
        account: parse_optional_column(row, 2)?,
        amount: parse_column(row, 3)?,
        amount_without_tax: parse_optional_column(row, 4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        details: parse_column(row, 7)?,
        source: row.get(8)?,
        time: parse_column(row, 9)?,
        title: row.get(10)?,
        tokenized: row.get(11)?,
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<AccountStatement> {
    Ok(AccountStatement {
        id: Some(row.get(0)?),
        external_id: parse_column(row, 1)?,
        destination_account: row.get(2)?,
        origin_account: row.get(3)?,
        amount: parse_column(row, 4)?,
        detail: row.get(5)?,
        post_date: parse_column(row, 6)?,
        title: row.get(7)?,
        kind: parse_column(row, 8)?,
    })
}

#[cfg(test)]
mod tests;
