#![allow(clippy::unwrap_used)]

use super::*;
use crate::bank::Feed;
use crate::import::{parse_account_statements, parse_card_statements};
use crate::testing::{
    raw_bill_payment, raw_card, raw_transfer_in, raw_transfer_out, ACCOUNT_ID_1, ACCOUNT_ID_2,
    ACCOUNT_ID_3, CARD_ID_1, CARD_ID_2,
};

fn seeded_db() -> Database {
    let mut db = Database::open_in_memory().unwrap();
    let cards = parse_card_statements(&[
        raw_card(CARD_ID_1, 3290, "Netflix.Com"),
        raw_card(CARD_ID_2, 1599, "Spotify"),
    ]);
    let accounts = parse_account_statements(&[
        raw_transfer_out(ACCOUNT_ID_1, "Jane Receiver"),
        raw_transfer_in(ACCOUNT_ID_2, "John Sender"),
        raw_bill_payment(ACCOUNT_ID_3),
    ]);
    db.insert_card_statements(&cards).unwrap();
    db.insert_account_statements(&accounts).unwrap();
    db
}

fn app_with(db: &Database) -> App {
    let mut app = App::new();
    app.refresh_all(db).unwrap();
    app
}

// ── Registry ──────────────────────────────────────────────────

#[test]
fn test_every_command_has_description() {
    for (name, cmd) in COMMANDS.iter() {
        assert!(!cmd.description.is_empty(), ":{name} has no description");
    }
}

#[test]
fn test_unknown_command_suggests_closest() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    handle_command("serch netflix", &mut app, &mut db).unwrap();
    assert!(app.status_message.contains("Did you mean :search?"));
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("same", "same"), 0);
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn test_switch_screens() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    assert_eq!(app.screen, Screen::CardStatements);
    assert_eq!(app.cards.len(), 2);

    app.view = View::Detail;
    handle_command("accounts", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::AccountStatements);
    assert_eq!(app.view, View::List);
    assert_eq!(app.accounts.len(), 3);

    handle_command("c", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::CardStatements);
}

#[test]
fn test_quit() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    handle_command("q", &mut app, &mut db).unwrap();
    assert!(!app.running);
}

// ── Filters ───────────────────────────────────────────────────

#[test]
fn test_search_and_clear() {
    let mut db = seeded_db();
    let mut app = app_with(&db);

    handle_command("search spotify", &mut app, &mut db).unwrap();
    assert_eq!(app.cards.len(), 1);
    assert_eq!(app.cards[0].description, "Spotify");
    assert_eq!(app.status_message, "1 matches for 'spotify'");

    handle_command("clear", &mut app, &mut db).unwrap();
    assert!(app.search_input.is_empty());
    assert_eq!(app.cards.len(), 2);
}

#[test]
fn test_date_range_commands() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    handle_command("a", &mut app, &mut db).unwrap();

    // Fixtures post on 2021-04-05, 2021-04-10 and 2021-04-14
    handle_command("from 2021-04-06", &mut app, &mut db).unwrap();
    assert_eq!(app.accounts.len(), 2);
    handle_command("to 2021-04-10", &mut app, &mut db).unwrap();
    assert_eq!(app.accounts.len(), 1);
    assert_eq!(app.accounts[0].kind, EventKind::TransferIn);

    handle_command("from", &mut app, &mut db).unwrap();
    assert_eq!(app.since, None);
    assert_eq!(app.accounts.len(), 2);
}

#[test]
fn test_invalid_date_keeps_filter() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    handle_command("from 2021-04-06", &mut app, &mut db).unwrap();
    handle_command("from 06/04/2021", &mut app, &mut db).unwrap();
    assert_eq!(app.since, NaiveDate::from_ymd_opt(2021, 4, 6));
    assert!(app.status_message.starts_with("Invalid date"));
}

#[test]
fn test_kind_filter() {
    let mut db = seeded_db();
    let mut app = app_with(&db);

    handle_command("kind transferout", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::AccountStatements);
    assert_eq!(app.kind, Some(EventKind::TransferOut));
    assert_eq!(app.accounts.len(), 1);
    assert_eq!(app.accounts[0].account_name(), Some("Jane Receiver"));

    handle_command("kind BillPaymentEvent", &mut app, &mut db).unwrap();
    assert_eq!(app.kind, Some(EventKind::BillPayment));

    handle_command("kind Nonsense", &mut app, &mut db).unwrap();
    assert_eq!(app.kind, Some(EventKind::BillPayment));
    assert!(app.status_message.starts_with("Unknown kind"));

    handle_command("kind", &mut app, &mut db).unwrap();
    assert_eq!(app.kind, None);
    assert_eq!(app.accounts.len(), 3);
}

#[test]
fn test_title_and_source_filters() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    app.screen = Screen::AccountStatements;

    handle_command("title transporte", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::CardStatements);
    assert_eq!(app.title.as_deref(), Some("transporte"));
    assert!(app.cards.is_empty());

    handle_command("title Serviços", &mut app, &mut db).unwrap();
    assert_eq!(app.cards.len(), 2);
    assert!(app.filter_label().contains("title 'Serviços'"));

    handle_command("source upfront_foreign", &mut app, &mut db).unwrap();
    assert!(app.cards.is_empty());
    handle_command("source", &mut app, &mut db).unwrap();
    assert_eq!(app.source, None);
    assert_eq!(app.cards.len(), 2);

    // Card-only filters leave the account list alone
    handle_command("source upfront_foreign", &mut app, &mut db).unwrap();
    app.refresh_accounts(&db).unwrap();
    assert_eq!(app.accounts.len(), 3);

    handle_command("clear", &mut app, &mut db).unwrap();
    assert_eq!(app.title, None);
    assert_eq!(app.source, None);
    assert_eq!(app.cards.len(), 2);
}

// ── Actions ───────────────────────────────────────────────────

#[test]
fn test_import_requests_current_feed() {
    let mut db = seeded_db();
    let mut app = app_with(&db);

    handle_command("import", &mut app, &mut db).unwrap();
    assert_eq!(app.pending_import, Some(Feed::CardStatements));

    app.pending_import = None;
    handle_command("a", &mut app, &mut db).unwrap();
    handle_command("i", &mut app, &mut db).unwrap();
    assert_eq!(app.pending_import, Some(Feed::AccountFeed));
}

#[test]
fn test_export_current_list() {
    let mut db = seeded_db();
    let mut app = app_with(&db);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.csv");

    handle_command(&format!("export {}", path.display()), &mut app, &mut db).unwrap();

    assert!(app.status_message.starts_with("Exported 2 statements"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Spotify"));
}

#[test]
fn test_finish_import_returns_to_list() {
    let db = seeded_db();
    let mut app = app_with(&db);
    app.view = View::Detail;

    app.finish_import(
        Feed::CardStatements,
        Err(anyhow::anyhow!("upstream unavailable")),
        &db,
    )
    .unwrap();
    assert_eq!(app.view, View::List);
    assert!(app.status_message.is_empty());

    app.finish_import(
        Feed::CardStatements,
        Ok(crate::import::ImportSummary {
            raw: 2,
            parsed: 2,
            inserted: 0,
            already_existing: 2,
        }),
        &db,
    )
    .unwrap();
    assert_eq!(
        app.status_message,
        "Imported card statements: 0 new, 2 already imported, 0 skipped"
    );
}
