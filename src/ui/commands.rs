use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;

use super::app::{App, Screen, View};
use crate::db::Database;
use crate::models::EventKind;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("c", "Go to card statements", cmd_cards, r);
    register_command!("cards", "Go to card statements", cmd_cards, r);
    register_command!("a", "Go to account statements", cmd_accounts, r);
    register_command!("accounts", "Go to account statements", cmd_accounts, r);
    register_command!("i", "Import this feed now", cmd_import, r);
    register_command!("import", "Import this feed now", cmd_import, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "search",
        "Search statements (e.g. :search netflix)",
        cmd_search,
        r
    );
    register_command!("s", "Search statements (e.g. :s netflix)", cmd_search, r);
    register_command!(
        "from",
        "Show statements on or after a date (e.g. :from 2021-03-01)",
        cmd_from,
        r
    );
    register_command!(
        "to",
        "Show statements on or before a date (e.g. :to 2021-03-31)",
        cmd_to,
        r
    );
    register_command!(
        "title",
        "Filter card statements by title (e.g. :title serviços)",
        cmd_title,
        r
    );
    register_command!(
        "source",
        "Filter card statements by source (e.g. :source upfront_national)",
        cmd_source,
        r
    );
    register_command!(
        "kind",
        "Filter account statements by kind (e.g. :kind TransferIn)",
        cmd_kind,
        r
    );
    register_command!("clear", "Clear search and filters", cmd_clear, r);
    register_command!(
        "export",
        "Export this list to CSV (e.g. :export ~/cards.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

pub(crate) fn switch_screen(app: &mut App, db: &Database, screen: Screen) -> anyhow::Result<()> {
    app.screen = screen;
    app.view = View::List;
    app.refresh_current(db)?;
    app.set_status(format!("{screen}"));
    Ok(())
}

fn cmd_cards(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    switch_screen(app, db, Screen::CardStatements)
}

fn cmd_accounts(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    switch_screen(app, db, Screen::AccountStatements)
}

fn cmd_import(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.request_import();
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.reset_cursor();
    app.refresh_current(db)?;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("{} matches for '{args}'", app.current_len()));
    }
    Ok(())
}

/// Empty clears the bound; anything else must be `YYYY-MM-DD`.
fn parse_date_arg(args: &str) -> Result<Option<NaiveDate>, String> {
    if args.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(args, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Invalid date '{args}'. Use YYYY-MM-DD (e.g. 2021-03-01)"))
}

fn cmd_from(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match parse_date_arg(args) {
        Ok(since) => {
            app.since = since;
            app.reset_cursor();
            app.refresh_current(db)?;
            app.set_status(match since {
                Some(d) => format!("Showing statements from {d}"),
                None => "Start date cleared".into(),
            });
        }
        Err(msg) => app.set_status(msg),
    }
    Ok(())
}

fn cmd_to(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match parse_date_arg(args) {
        Ok(until) => {
            app.until = until;
            app.reset_cursor();
            app.refresh_current(db)?;
            app.set_status(match until {
                Some(d) => format!("Showing statements up to {d}"),
                None => "End date cleared".into(),
            });
        }
        Err(msg) => app.set_status(msg),
    }
    Ok(())
}

/// Set or clear one of the card-only filters and jump to the card list.
fn set_card_filter(
    args: &str,
    app: &mut App,
    db: &Database,
    name: &str,
    slot: fn(&mut App) -> &mut Option<String>,
) -> anyhow::Result<()> {
    *slot(app) = (!args.is_empty()).then(|| args.to_string());
    app.screen = Screen::CardStatements;
    app.view = View::List;
    app.card_index = 0;
    app.card_scroll = 0;
    app.refresh_cards(db)?;
    if args.is_empty() {
        app.set_status(format!("{name} filter cleared"));
    } else {
        app.set_status(format!(
            "{} card statements with {} '{args}'",
            app.cards.len(),
            name.to_lowercase()
        ));
    }
    Ok(())
}

fn cmd_title(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_card_filter(args, app, db, "Title", |app| &mut app.title)
}

fn cmd_source(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_card_filter(args, app, db, "Source", |app| &mut app.source)
}

fn cmd_kind(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.kind = None;
        app.refresh_accounts(db)?;
        app.set_status("Kind filter cleared");
        return Ok(());
    }

    match EventKind::parse_lenient(args) {
        Some(kind) => {
            app.kind = Some(kind);
            app.screen = Screen::AccountStatements;
            app.view = View::List;
            app.account_index = 0;
            app.account_scroll = 0;
            app.refresh_accounts(db)?;
            app.set_status(format!("Showing {kind} ({} group)", kind.group()));
        }
        None => {
            let kinds: Vec<&str> = EventKind::all().iter().map(|k| k.as_str()).collect();
            app.set_status(format!("Unknown kind '{args}'. Kinds: {}", kinds.join(", ")));
        }
    }
    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input.clear();
    app.since = None;
    app.until = None;
    app.title = None;
    app.source = None;
    app.kind = None;
    app.reset_cursor();
    app.refresh_all(db)?;
    app.set_status("Filters cleared");
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let default_name = match app.screen {
        Screen::CardStatements => "bankfeed-card-statements.csv",
        Screen::AccountStatements => "bankfeed-account-statements.csv",
    };
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{default_name}")
    } else {
        crate::run::shellexpand(args)
    };

    let filter = crate::db::StatementFilter {
        limit: None,
        ..app.filter()
    };
    let count = match app.screen {
        Screen::CardStatements => db.export_card_statements(Path::new(&path), &filter)?,
        Screen::AccountStatements => db.export_account_statements(Path::new(&path), &filter)?,
    };
    app.set_status(format!("Exported {count} statements to {path}"));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
