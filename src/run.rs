mod cli;
mod tui;

use anyhow::Result;

use crate::bank::{Feed, StatementSource};
use crate::cache::{Cache, CachePolicy};
use crate::db::Database;
use crate::import::{import_account_statements, import_card_statements, ImportSummary};

pub(crate) use cli::{as_cli, shellexpand};
pub(crate) use tui::as_tui;

/// Run the import pipeline for one feed.
pub(crate) fn import_feed(
    feed: Feed,
    source: &dyn StatementSource,
    cache: &dyn Cache,
    policy: CachePolicy,
    db: &mut Database,
) -> Result<ImportSummary> {
    match feed {
        Feed::CardStatements => import_card_statements(source, cache, policy, db),
        Feed::AccountFeed => import_account_statements(source, cache, policy, db),
    }
}
