use anyhow::{Context, Result};
use std::path::Path;

use super::{money, timestamp, Database, StatementFilter};

impl Database {
    /// Write the filtered card statements to `path`. Returns the row count.
    pub(crate) fn export_card_statements(
        &self,
        path: &Path,
        filter: &StatementFilter,
    ) -> Result<usize> {
        let statements = self.get_card_statements(filter)?;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        wtr.write_record([
            "external_id",
            "time",
            "title",
            "description",
            "category",
            "amount",
            "amount_without_tax",
            "account",
            "source",
            "tokenized",
        ])?;
        for s in &statements {
            wtr.write_record([
                s.external_id.to_string(),
                timestamp(&s.time),
                s.title.clone(),
                s.description.clone(),
                s.category.clone(),
                money(&s.amount),
                s.amount_without_tax.as_ref().map(money).unwrap_or_default(),
                s.account.map(|a| a.to_string()).unwrap_or_default(),
                s.source.clone().unwrap_or_default(),
                s.tokenized.map(|t| t.to_string()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(statements.len())
    }

    pub(crate) fn export_account_statements(
        &self,
        path: &Path,
        filter: &StatementFilter,
    ) -> Result<usize> {
        let statements = self.get_account_statements(filter)?;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        wtr.write_record([
            "external_id",
            "post_date",
            "kind",
            "title",
            "detail",
            "amount",
            "origin_account",
            "destination_account",
        ])?;
        for s in &statements {
            wtr.write_record([
                s.external_id.to_string(),
                s.post_date.to_string(),
                s.kind.as_str().to_string(),
                s.title.clone(),
                s.detail.clone(),
                money(&s.amount),
                s.origin_account.clone().unwrap_or_default(),
                s.destination_account.clone().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(statements.len())
    }
}
