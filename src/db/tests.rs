#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

fn card(n: u128, description: &str, amount: Decimal, day: u32) -> CardStatement {
    CardStatement {
        id: None,
        external_id: Uuid::from_u128(n),
        account: Some(Uuid::from_u128(999)),
        amount,
        amount_without_tax: None,
        category: "transaction".into(),
        description: description.into(),
        details: json!({"status": "settled"}),
        source: Some("upfront_national".into()),
        time: Utc.with_ymd_and_hms(2021, 3, day, 10, 56, 13).unwrap(),
        title: "serviços".into(),
        tokenized: Some(true),
    }
}

fn account(n: u128, kind: EventKind, detail: &str, day: u32) -> AccountStatement {
    let mut s = AccountStatement::new(
        Uuid::from_u128(n),
        kind,
        dec!(50.00),
        detail.into(),
        NaiveDate::from_ymd_opt(2021, 4, day).unwrap(),
        "Transferência".into(),
    );
    if kind.is_transfer_out() {
        s.destination_account = Some("Jane Receiver".into());
    } else if kind.is_transfer_in() {
        s.origin_account = Some("John Sender".into());
    }
    s
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, day).unwrap()
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.card_statement_count().unwrap(), 0);
    assert_eq!(db.account_statement_count().unwrap(), 0);
}

#[test]
fn test_reopen_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bankfeed.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.insert_card_statements(&[card(1, "Netflix.Com", dec!(32.90), 21)])
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.card_statement_count().unwrap(), 1);
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

// ── Card statements ───────────────────────────────────────────

#[test]
fn test_card_statement_round_trip() {
    let mut db = Database::open_in_memory().unwrap();
    let mut original = card(1, "Netflix.Com", dec!(32.90), 21);
    original.amount_without_tax = Some(dec!(31.75));
    original.details = json!({"status": "settled", "tags": ["streaming"]});
    db.insert_card_statements(&[original.clone()]).unwrap();

    let stored = db.get_card_statements(&StatementFilter::default()).unwrap();
    assert_eq!(stored.len(), 1);
    let id = stored[0].id.unwrap();
    assert_eq!(CardStatement { id: None, ..stored[0].clone() }, original);

    let by_id = db.get_card_statement_by_id(id).unwrap().unwrap();
    assert_eq!(by_id.external_id, original.external_id);
    assert!(db.get_card_statement_by_id(id + 100).unwrap().is_none());
}

#[test]
fn test_card_insert_is_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    let batch = vec![
        card(1, "Netflix.Com", dec!(32.90), 21),
        card(2, "Spotify", dec!(16.90), 22),
    ];

    let first = db.insert_card_statements(&batch).unwrap();
    let second = db.insert_card_statements(&batch).unwrap();

    assert_eq!(
        first,
        PersistOutcome {
            inserted: 2,
            already_existing: 0
        }
    );
    assert_eq!(
        second,
        PersistOutcome {
            inserted: 0,
            already_existing: 2
        }
    );
    assert_eq!(db.card_statement_count().unwrap(), 2);
}

#[test]
fn test_duplicate_inside_one_batch_counts_once() {
    let mut db = Database::open_in_memory().unwrap();
    let mut changed = card(1, "Netflix.Com (retry)", dec!(1.00), 21);
    changed.title = "outro".into();
    let outcome = db
        .insert_card_statements(&[card(1, "Netflix.Com", dec!(32.90), 21), changed])
        .unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.already_existing, 1);

    // First write wins
    let stored = db.get_card_statements(&StatementFilter::default()).unwrap();
    assert_eq!(stored[0].description, "Netflix.Com");
}

#[test]
fn test_empty_batch() {
    let mut db = Database::open_in_memory().unwrap();
    assert_eq!(
        db.insert_card_statements(&[]).unwrap(),
        PersistOutcome::default()
    );
}

#[test]
fn test_card_statements_newest_first_with_limit() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[
        card(1, "Padaria", dec!(8.50), 2),
        card(2, "Mercado", dec!(120.35), 15),
        card(3, "Farmácia", dec!(42.00), 9),
    ])
    .unwrap();

    let all = db.get_card_statements(&StatementFilter::default()).unwrap();
    let names: Vec<&str> = all.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["Mercado", "Farmácia", "Padaria"]);

    let limited = db
        .get_card_statements(&StatementFilter {
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].description, "Mercado");
}

#[test]
fn test_card_search_matches_description_title_and_amount() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[
        card(1, "Netflix.Com", dec!(32.90), 21),
        card(2, "Spotify", dec!(16.90), 22),
    ])
    .unwrap();

    let search = |s: &str| {
        db.get_card_statements(&StatementFilter {
            search: Some(s.into()),
            ..Default::default()
        })
        .unwrap()
        .len()
    };
    assert_eq!(search("netflix"), 1);
    assert_eq!(search("16.90"), 1);
    assert_eq!(search("serviços"), 2);
    assert_eq!(search("uber"), 0);
}

#[test]
fn test_card_date_range_is_inclusive() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[
        card(1, "A", dec!(1), 1),
        card(2, "B", dec!(2), 10),
        card(3, "C", dec!(3), 20),
    ])
    .unwrap();

    let found = db
        .get_card_statements(&StatementFilter {
            since: Some(date(10)),
            until: Some(date(20)),
            ..Default::default()
        })
        .unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["C", "B"]);

    let only_first = db
        .get_card_statements(&StatementFilter {
            until: Some(date(1)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(only_first.len(), 1);
}

#[test]
fn test_card_title_and_source_filters() {
    let mut db = Database::open_in_memory().unwrap();
    let mut uber = card(2, "Uber *Trip", dec!(18.40), 22);
    uber.title = "transporte".into();
    let mut abroad = card(3, "Steam Purchase", dec!(45.00), 23);
    abroad.source = Some("upfront_foreign".into());
    db.insert_card_statements(&[card(1, "Netflix.Com", dec!(32.90), 21), uber, abroad])
        .unwrap();

    let by_title = db
        .get_card_statements(&StatementFilter {
            title: Some("Transporte".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].description, "Uber *Trip");

    let by_source = db
        .get_card_statements(&StatementFilter {
            source: Some("upfront_national".into()),
            ..Default::default()
        })
        .unwrap();
    let names: Vec<&str> = by_source.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["Uber *Trip", "Netflix.Com"]);

    let both = db
        .get_card_statements(&StatementFilter {
            title: Some("serviços".into()),
            source: Some("upfront_foreign".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].description, "Steam Purchase");

    // A partial title is not a match
    let partial = db
        .get_card_statements(&StatementFilter {
            title: Some("serv".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(partial.is_empty());
}

#[test]
fn test_search_wildcards_match_literally() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[
        card(1, "Cashback 100%", dec!(5.00), 21),
        card(2, "Mercado_Livre", dec!(80.00), 22),
        card(3, "Padaria", dec!(8.50), 23),
    ])
    .unwrap();
    db.insert_account_statements(&[
        account(1, EventKind::BillPayment, "Fatura 50% paga", 5),
        account(2, EventKind::BillPayment, "Fatura", 6),
    ])
    .unwrap();

    let cards = |s: &str| {
        db.get_card_statements(&StatementFilter {
            search: Some(s.into()),
            ..Default::default()
        })
        .unwrap()
        .len()
    };
    assert_eq!(cards("%"), 1);
    assert_eq!(cards("_"), 1);
    assert_eq!(cards("o_L"), 1);
    assert_eq!(cards("P_d"), 0);

    let accounts = db
        .get_account_statements(&StatementFilter {
            search: Some("%".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].detail, "Fatura 50% paga");
}

#[test]
fn test_amount_stored_with_two_places() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[card(1, "Padaria", dec!(8.5), 2)])
        .unwrap();
    let stored: String = db
        .conn
        .query_row("SELECT amount FROM card_statements", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, "8.50");
}

#[test]
fn test_corrupt_row_is_an_error() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[card(1, "Padaria", dec!(8.50), 2)])
        .unwrap();
    db.conn
        .execute("UPDATE card_statements SET amount = 'lots'", [])
        .unwrap();
    assert!(db.get_card_statements(&StatementFilter::default()).is_err());
}

// ── Account statements ────────────────────────────────────────

#[test]
fn test_account_statement_round_trip() {
    let mut db = Database::open_in_memory().unwrap();
    let original = account(1, EventKind::TransferIn, "R$ 50,00", 10);
    db.insert_account_statements(&[original.clone()]).unwrap();

    let stored = db
        .get_account_statements(&StatementFilter::default())
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        AccountStatement {
            id: None,
            ..stored[0].clone()
        },
        original
    );
    let by_id = db
        .get_account_statement_by_id(stored[0].id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(by_id.origin_account.as_deref(), Some("John Sender"));
}

#[test]
fn test_account_insert_is_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    let batch = vec![
        account(1, EventKind::TransferOut, "Jane - R$ 50,00", 14),
        account(2, EventKind::BillPayment, "Fatura", 5),
    ];
    db.insert_account_statements(&batch).unwrap();
    let again = db.insert_account_statements(&batch).unwrap();
    assert_eq!(again.already_existing, 2);
    assert_eq!(db.account_statement_count().unwrap(), 2);
}

#[test]
fn test_account_filters() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_account_statements(&[
        account(1, EventKind::TransferOut, "Jane - R$ 50,00", 14),
        account(2, EventKind::BillPayment, "Fatura", 5),
        account(3, EventKind::TransferIn, "Salário", 1),
    ])
    .unwrap();

    let all = db
        .get_account_statements(&StatementFilter::default())
        .unwrap();
    let days: Vec<u32> = all.iter().map(|s| chrono::Datelike::day(&s.post_date)).collect();
    assert_eq!(days, vec![14, 5, 1]);

    let transfers_in = db
        .get_account_statements(&StatementFilter {
            kind: Some(EventKind::TransferIn),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(transfers_in.len(), 1);

    let by_name = db
        .get_account_statements(&StatementFilter {
            search: Some("jane receiver".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].kind, EventKind::TransferOut);

    let by_external_id = db
        .get_account_statements(&StatementFilter {
            search: Some(Uuid::from_u128(2).to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_external_id[0].detail, "Fatura");

    let range = db
        .get_account_statements(&StatementFilter {
            since: NaiveDate::from_ymd_opt(2021, 4, 5),
            until: NaiveDate::from_ymd_opt(2021, 4, 14),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(range.len(), 2);
}

// ── CSV export ────────────────────────────────────────────────

#[test]
fn test_export_card_statements_csv() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_card_statements(&[
        card(1, "Netflix.Com", dec!(32.90), 21),
        card(2, "Spotify", dec!(16.90), 22),
    ])
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.csv");

    let count = db
        .export_card_statements(
            &path,
            &StatementFilter {
                search: Some("Netflix".into()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(count, 1);
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("external_id,time,title"));
    assert!(lines[1].contains("Netflix.Com"));
    assert!(lines[1].contains("32.90"));
}

#[test]
fn test_export_account_statements_csv() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_account_statements(&[account(1, EventKind::TransferOut, "Jane, R$ 50,00", 14)])
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.csv");

    assert_eq!(
        db.export_account_statements(&path, &StatementFilter::default())
            .unwrap(),
        1
    );
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("TransferOutEvent"));
    // Commas in the detail are quoted
    assert!(content.contains("\"Jane, R$ 50,00\""));
    assert!(content.contains("Jane Receiver"));
}

#[test]
fn test_filter_is_empty() {
    assert!(StatementFilter::default().is_empty());
    let limited = StatementFilter {
        limit: Some(10),
        ..Default::default()
    };
    assert!(limited.is_empty());
    let searched = StatementFilter {
        search: Some("x".into()),
        ..Default::default()
    };
    assert!(!searched.is_empty());
    let by_source = StatementFilter {
        source: Some("upfront_national".into()),
        ..Default::default()
    };
    assert!(!by_source.is_empty());
}
