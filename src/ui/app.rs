use anyhow::Result;
use chrono::NaiveDate;

use crate::bank::Feed;
use crate::db::{Database, StatementFilter};
use crate::import::ImportSummary;
use crate::models::{AccountStatement, CardStatement, EventKind};

/// Rows loaded per list; the title shows the full table count.
pub(crate) const LIST_LIMIT: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    CardStatements,
    AccountStatements,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::CardStatements, Self::AccountStatements]
    }

    /// The feed an "import now" on this screen pulls.
    pub(crate) fn feed(&self) -> Feed {
        match self {
            Self::CardStatements => Feed::CardStatements,
            Self::AccountStatements => Feed::AccountFeed,
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardStatements => write!(f, "Card statements"),
            Self::AccountStatements => write!(f, "Account statements"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    List,
    Detail,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) view: View,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Dates apply to both screens. Title and source narrow card statements,
    // kind narrows account statements.
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
    pub(crate) title: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) kind: Option<EventKind>,

    // Card statements
    pub(crate) cards: Vec<CardStatement>,
    pub(crate) card_index: usize,
    pub(crate) card_scroll: usize,
    pub(crate) card_count: i64,

    // Account statements
    pub(crate) accounts: Vec<AccountStatement>,
    pub(crate) account_index: usize,
    pub(crate) account_scroll: usize,
    pub(crate) account_count: i64,

    /// Set by the import command, picked up by the event loop.
    pub(crate) pending_import: Option<Feed>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::CardStatements,
            view: View::List,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,

            since: None,
            until: None,
            title: None,
            source: None,
            kind: None,

            cards: Vec::new(),
            card_index: 0,
            card_scroll: 0,
            card_count: 0,

            accounts: Vec::new(),
            account_index: 0,
            account_scroll: 0,
            account_count: 0,

            pending_import: None,

            visible_rows: 20,
        }
    }

    pub(crate) fn filter(&self) -> StatementFilter {
        StatementFilter {
            search: (!self.search_input.is_empty()).then(|| self.search_input.clone()),
            since: self.since,
            until: self.until,
            title: self.title.clone(),
            source: self.source.clone(),
            kind: self.kind,
            limit: Some(LIST_LIMIT),
        }
    }

    pub(crate) fn refresh_cards(&mut self, db: &Database) -> Result<()> {
        self.cards = db.get_card_statements(&self.filter())?;
        self.card_count = db.card_statement_count()?;
        clamp_cursor(&mut self.card_index, &mut self.card_scroll, self.cards.len());
        Ok(())
    }

    pub(crate) fn refresh_accounts(&mut self, db: &Database) -> Result<()> {
        self.accounts = db.get_account_statements(&self.filter())?;
        self.account_count = db.account_statement_count()?;
        clamp_cursor(
            &mut self.account_index,
            &mut self.account_scroll,
            self.accounts.len(),
        );
        Ok(())
    }

    pub(crate) fn refresh_current(&mut self, db: &Database) -> Result<()> {
        match self.screen {
            Screen::CardStatements => self.refresh_cards(db),
            Screen::AccountStatements => self.refresh_accounts(db),
        }
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_cards(db)?;
        self.refresh_accounts(db)?;
        Ok(())
    }

    /// Rows shown for the current screen.
    pub(crate) fn current_len(&self) -> usize {
        match self.screen {
            Screen::CardStatements => self.cards.len(),
            Screen::AccountStatements => self.accounts.len(),
        }
    }

    /// Cursor and scroll offset of the current screen.
    pub(crate) fn cursor_mut(&mut self) -> (&mut usize, &mut usize) {
        match self.screen {
            Screen::CardStatements => (&mut self.card_index, &mut self.card_scroll),
            Screen::AccountStatements => (&mut self.account_index, &mut self.account_scroll),
        }
    }

    pub(crate) fn reset_cursor(&mut self) {
        let (index, scroll) = self.cursor_mut();
        *index = 0;
        *scroll = 0;
    }

    pub(crate) fn selected_card(&self) -> Option<&CardStatement> {
        self.cards.get(self.card_index)
    }

    pub(crate) fn selected_account(&self) -> Option<&AccountStatement> {
        self.accounts.get(self.account_index)
    }

    /// Rows that fit in the list body (minus borders and header).
    pub(crate) fn page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn request_import(&mut self) {
        let feed = self.screen.feed();
        self.pending_import = Some(feed);
        self.set_status(format!("Importing {feed}..."));
    }

    /// Record the end of an "import now" run. Failures are only logged.
    pub(crate) fn finish_import(
        &mut self,
        feed: Feed,
        outcome: Result<ImportSummary>,
        db: &Database,
    ) -> Result<()> {
        self.view = View::List;
        match outcome {
            Ok(summary) => self.set_status(format!("Imported {feed}: {summary}")),
            Err(e) => {
                tracing::error!(%feed, error = ?e, "Import from admin UI failed");
                self.status_message.clear();
            }
        }
        self.refresh_all(db)
    }

    /// Summary of the active filters for list titles.
    pub(crate) fn filter_label(&self) -> String {
        let mut parts = Vec::new();
        if !self.search_input.is_empty() {
            parts.push(format!("search: '{}'", self.search_input));
        }
        if let Some(since) = self.since {
            parts.push(format!("from {since}"));
        }
        if let Some(until) = self.until {
            parts.push(format!("to {until}"));
        }
        if self.screen == Screen::CardStatements {
            if let Some(title) = &self.title {
                parts.push(format!("title '{title}'"));
            }
            if let Some(source) = &self.source {
                parts.push(format!("source '{source}'"));
            }
        }
        if let (Screen::AccountStatements, Some(kind)) = (self.screen, self.kind) {
            parts.push(format!("kind {kind}"));
        }
        parts.join(", ")
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
