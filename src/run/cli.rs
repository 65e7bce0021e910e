use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::bank::{self, Feed};
use crate::cache::{Cache, CachePolicy};
use crate::config::Config;
use crate::db::{Database, StatementFilter};
use crate::models::EventKind;
use crate::ui::util::{first_line, format_amount, truncate};

/// Flags that take a value; everything else is positional.
const VALUE_FLAGS: &[&str] = &[
    "--from",
    "--cache-policy",
    "--search",
    "--since",
    "--until",
    "--title",
    "--source",
    "--kind",
    "--limit",
];

pub(crate) fn as_cli(
    args: &[String],
    config: &Config,
    cache: &dyn Cache,
    db: &mut Database,
) -> Result<()> {
    match args[1].as_str() {
        "import" | "i" => cli_import(&args[2..], config, cache, db),
        "list" | "ls" => cli_list(&args[2..], db),
        "show" => cli_show(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("bankfeed {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("bankfeed - bank statement feed importer");
    println!();
    println!("Usage: bankfeed [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch the admin TUI");
    println!("  import [cards|accounts|all]     Fetch, parse and save statements (default: all)");
    println!("    --from <dir>                  Replay a saved export instead of the live API");
    println!("    --cache-policy <policy>       push-pull, pull, push or ignore");
    println!("  list <cards|accounts>           Print saved statements, newest first");
    println!("    --search <text>               Match title, description, detail or amount");
    println!("    --since <YYYY-MM-DD>          On or after this date");
    println!("    --until <YYYY-MM-DD>          On or before this date");
    println!("    --title <title>               Card title (e.g. serviços)");
    println!("    --source <source>             Card source (e.g. upfront_national)");
    println!("    --kind <kind>                 Account event kind (e.g. TransferIn)");
    println!("    --limit <n>                   At most n rows (default: 50)");
    println!("  show <cards|accounts> <id>      Print every field of one statement");
    println!("  export <cards|accounts> [path]  Write statements to CSV (takes list filters)");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_feed(name: &str) -> Result<Feed> {
    match name {
        "cards" | "card" | "c" => Ok(Feed::CardStatements),
        "accounts" | "account" | "a" => Ok(Feed::AccountFeed),
        other => anyhow::bail!("Unknown feed '{other}' (expected 'cards' or 'accounts')"),
    }
}

fn parse_feeds(name: Option<&str>) -> Result<Vec<Feed>> {
    match name {
        None | Some("all") => Ok(vec![Feed::CardStatements, Feed::AccountFeed]),
        Some(name) => Ok(vec![parse_feed(name)?]),
    }
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{name} must be YYYY-MM-DD, got '{value}'"))
}

fn parse_filter(args: &[String], default_limit: Option<u32>) -> Result<StatementFilter> {
    let kind = flag(args, "--kind")
        .map(|k| {
            EventKind::parse_lenient(k).ok_or_else(|| anyhow::anyhow!("Unknown event kind '{k}'"))
        })
        .transpose()?;
    let limit = match flag(args, "--limit") {
        Some(n) => Some(
            n.parse::<u32>()
                .with_context(|| format!("--limit must be a number, got '{n}'"))?,
        ),
        None => default_limit,
    };
    Ok(StatementFilter {
        search: flag(args, "--search").map(str::to_string),
        since: flag(args, "--since")
            .map(|d| parse_date(d, "--since"))
            .transpose()?,
        until: flag(args, "--until")
            .map(|d| parse_date(d, "--until"))
            .transpose()?,
        title: flag(args, "--title").map(str::to_string),
        source: flag(args, "--source").map(str::to_string),
        kind,
        limit,
    })
}

// ── Commands ─────────────────────────────────────────────────

fn cli_import(
    args: &[String],
    config: &Config,
    cache: &dyn Cache,
    db: &mut Database,
) -> Result<()> {
    let positional = positionals(args);
    let feeds = parse_feeds(positional.first().copied())?;
    let export_dir = flag(args, "--from").map(|d| PathBuf::from(shellexpand(d)));

    // A replayed export must not be shadowed by a cached live fetch
    let policy = match (flag(args, "--cache-policy"), &export_dir) {
        (Some(p), _) => CachePolicy::parse(p),
        (None, Some(_)) => CachePolicy::Bypass,
        (None, None) => config.cache_policy,
    };

    let source = bank::connect(config, export_dir.as_deref())?;
    for feed in feeds {
        let summary = super::import_feed(feed, source.as_ref(), cache, policy, db)
            .with_context(|| format!("Failed to import {feed}"))?;
        println!("{feed}: {summary}");
    }
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let positional = positionals(args);
    let feed = parse_feed(
        positional
            .first()
            .ok_or_else(|| anyhow::anyhow!("Usage: bankfeed list <cards|accounts> [filters]"))?,
    )?;
    let filter = parse_filter(args, Some(50))?;

    match feed {
        Feed::CardStatements => {
            let statements = db.get_card_statements(&filter)?;
            if statements.is_empty() {
                print_no_rows("card", &filter);
                return Ok(());
            }
            println!(
                "{:<6} {:<17} {:>14}  {:<40} Title",
                "ID", "Time", "Amount", "Description"
            );
            println!("{}", "─".repeat(96));
            for s in &statements {
                println!(
                    "{:<6} {:<17} {:>14}  {:<40} {}",
                    s.id.unwrap_or(0),
                    s.time.format("%Y-%m-%d %H:%M"),
                    format_amount(s.amount),
                    truncate(&s.description, 40),
                    s.title,
                );
            }
            println!("{} of {} card statements", statements.len(), db.card_statement_count()?);
        }
        Feed::AccountFeed => {
            let statements = db.get_account_statements(&filter)?;
            if statements.is_empty() {
                print_no_rows("account", &filter);
                return Ok(());
            }
            println!(
                "{:<6} {:<10} {:<26} {:>14}  {:<30} Account",
                "ID", "Date", "Kind", "Amount", "Detail"
            );
            println!("{}", "─".repeat(110));
            for s in &statements {
                println!(
                    "{:<6} {:<10} {:<26} {:>14}  {:<30} {}",
                    s.id.unwrap_or(0),
                    s.post_date,
                    s.kind,
                    format_amount(s.amount),
                    truncate(first_line(&s.detail), 30),
                    s.account_name().unwrap_or(""),
                );
            }
            println!(
                "{} of {} account statements",
                statements.len(),
                db.account_statement_count()?
            );
        }
    }
    Ok(())
}

fn print_no_rows(name: &str, filter: &StatementFilter) {
    if filter.is_empty() {
        println!("No {name} statements");
    } else {
        println!("No {name} statements match the filters");
    }
}

fn cli_show(args: &[String], db: &mut Database) -> Result<()> {
    let usage = "Usage: bankfeed show <cards|accounts> <id>";
    let positional = positionals(args);
    let (feed, id) = match positional.as_slice() {
        [feed, id, ..] => (parse_feed(feed)?, *id),
        _ => anyhow::bail!(usage),
    };
    let id: i64 = id
        .parse()
        .with_context(|| format!("Statement id must be a number, got '{id}'"))?;

    match feed {
        Feed::CardStatements => {
            let s = db
                .get_card_statement_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("No card statement with id {id}"))?;
            println!("{s}");
            println!("{}", "─".repeat(40));
            println!("  External id:   {}", s.external_id);
            if let Some(account) = s.account {
                println!("  Account:       {account}");
            }
            println!("  Time:          {}", s.time.to_rfc3339());
            println!("  Title:         {}", s.title);
            println!("  Category:      {}", s.category);
            println!("  Amount:        {}", format_amount(s.amount));
            if let Some(without_tax) = s.amount_without_tax {
                println!("  Without tax:   {}", format_amount(without_tax));
            }
            if let Some(source) = &s.source {
                println!("  Source:        {source}");
            }
            if let Some(tokenized) = s.tokenized {
                println!("  Tokenized:     {tokenized}");
            }
            println!("  Details:");
            for line in serde_json::to_string_pretty(&s.details)?.lines() {
                println!("    {line}");
            }
        }
        Feed::AccountFeed => {
            let s = db
                .get_account_statement_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("No account statement with id {id}"))?;
            println!("({}) {}", s.post_date, s.title);
            println!("{}", "─".repeat(40));
            println!("  External id:   {}", s.external_id);
            println!("  Kind:          {} ({})", s.kind, s.kind.group());
            println!("  Amount:        {}", format_amount(s.amount));
            if let Some(origin) = &s.origin_account {
                println!("  Origin:        {origin}");
            }
            if let Some(destination) = &s.destination_account {
                println!("  Destination:   {destination}");
            }
            println!("  Detail:");
            for line in s.detail.lines() {
                println!("    {line}");
            }
        }
    }
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let positional = positionals(args);
    let feed = parse_feed(positional.first().ok_or_else(|| {
        anyhow::anyhow!("Usage: bankfeed export <cards|accounts> [path] [filters]")
    })?)?;
    let filter = parse_filter(args, None)?;

    let output_path = positional
        .get(1)
        .map(|p| shellexpand(p))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let name = match feed {
                Feed::CardStatements => "bankfeed-card-statements.csv",
                Feed::AccountFeed => "bankfeed-account-statements.csv",
            };
            format!("{home}/{name}")
        });

    let count = match feed {
        Feed::CardStatements => db.export_card_statements(Path::new(&output_path), &filter)?,
        Feed::AccountFeed => db.export_account_statements(Path::new(&output_path), &filter)?,
    };
    if count == 0 {
        println!("No statements to export");
    } else {
        println!("Exported {count} statements to {output_path}");
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
