pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS card_statements (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id         TEXT NOT NULL,
    account             TEXT,
    amount              TEXT NOT NULL,
    amount_without_tax  TEXT,
    category            TEXT NOT NULL,
    description         TEXT NOT NULL,
    details             TEXT NOT NULL,
    source              TEXT,
    time                TEXT NOT NULL,
    title               TEXT NOT NULL,
    tokenized           BOOLEAN
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_card_statements_external_id ON card_statements(external_id);
CREATE INDEX IF NOT EXISTS idx_card_statements_time ON card_statements(time);

CREATE TABLE IF NOT EXISTS account_statements (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id          TEXT NOT NULL,
    destination_account  TEXT,
    origin_account       TEXT,
    amount               TEXT NOT NULL,
    detail               TEXT NOT NULL,
    post_date            TEXT NOT NULL,
    title                TEXT NOT NULL,
    kind                 TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_account_statements_external_id ON account_statements(external_id);
CREATE INDEX IF NOT EXISTS idx_account_statements_post_date ON account_statements(post_date);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
