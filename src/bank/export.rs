use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{RawRecord, StatementSource};

pub(crate) const CARD_STATEMENTS_FILE: &str = "card_statements.json";
pub(crate) const ACCOUNT_FEED_FILE: &str = "account_feed.json";

/// Replays a feed saved to disk: one JSON array per feed in `dir`.
pub(crate) struct ExportSource {
    dir: PathBuf,
}

impl ExportSource {
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Export directory not found: {}", dir.display());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn read(&self, name: &str) -> Result<Vec<RawRecord>> {
        let path = self.dir.join(name);
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("{} is not a JSON list of records", path.display()))
    }
}

impl StatementSource for ExportSource {
    fn card_statements(&self) -> Result<Vec<RawRecord>> {
        self.read(CARD_STATEMENTS_FILE)
    }

    fn account_feed(&self) -> Result<Vec<RawRecord>> {
        self.read(ACCOUNT_FEED_FILE)
    }
}
