//! Append-only schema migrations.
//!
//! Each entry maps a target version to the SQL that takes the database there.
//! Released entries are never edited, only appended. Applying a version runs
//! its SQL and records the ledger row inside one transaction, so a failure
//! partway through a multi-step upgrade leaves the file at the last fully
//! applied version and the next launch picks up from there.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};

/// Version 1 is the base schema; a fresh file replays everything from here.
const MIGRATIONS: &[(i64, &str)] = &[
    (
        1,
        "CREATE TABLE schema_version (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version INTEGER NOT NULL,
    applied_at TIMESTAMP NOT NULL
);

CREATE TABLE task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    summary TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);

CREATE TABLE task_sequence (
    id INTEGER PRIMARY KEY,
    sequence JSON NOT NULL
);

INSERT INTO task_sequence (id, sequence) VALUES (1, '[]');
",
    ),
    (
        2,
        "ALTER TABLE task ADD COLUMN context TEXT;
",
    ),
];

/// The highest schema version this build understands.
pub fn latest_version() -> i64 {
    match MIGRATIONS.last() {
        Some((version, _)) => *version,
        None => 0,
    }
}

/// The latest version recorded in the ledger, or 0 for a fresh file.
pub fn recorded_version(conn: &Connection) -> Result<i64> {
    let ledger_exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if ledger_exists == 0 {
        return Ok(0);
    }

    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Bring the database up to [`latest_version`].
///
/// A file written by a newer build is refused before any mutation.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let current = recorded_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(Error::SchemaDowngrade {
            found: current,
            supported: latest,
        });
    }

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        apply_one(conn, *version, sql)?;
    }

    Ok(())
}

fn apply_one(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let step = |conn: &mut Connection| -> std::result::Result<(), rusqlite::Error> {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![version, Utc::now()],
        )?;
        tx.commit()
    };

    step(conn).map_err(|source| Error::Migration { version, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        Connection::open_in_memory().expect("in-memory database should open")
    }

    #[test]
    fn fresh_file_reaches_latest_version() {
        let mut conn = fresh_conn();
        migrate(&mut conn).expect("migration should succeed");

        assert_eq!(
            recorded_version(&conn).expect("version should be readable"),
            latest_version()
        );

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY id")
            .expect("ledger should be queryable")
            .query_map([], |row| row.get(0))
            .expect("rows should map")
            .collect::<std::result::Result<_, _>>()
            .expect("rows should decode");
        assert_eq!(versions, (1..=latest_version()).collect::<Vec<i64>>());
    }

    #[test]
    fn migrate_twice_records_nothing_new() {
        let mut conn = fresh_conn();
        migrate(&mut conn).expect("first migration should succeed");
        migrate(&mut conn).expect("second migration should succeed");

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .expect("ledger should be queryable");
        assert_eq!(rows, latest_version());
    }

    #[test]
    fn newer_file_is_refused_without_mutation() {
        let mut conn = fresh_conn();
        migrate(&mut conn).expect("migration should succeed");
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![latest_version() + 5, Utc::now()],
        )
        .expect("ledger insert should succeed");

        let err = migrate(&mut conn).expect_err("downgrade should be refused");
        match err {
            Error::SchemaDowngrade { found, supported } => {
                assert_eq!(found, latest_version() + 5);
                assert_eq!(supported, latest_version());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The refusal must leave existing data untouched.
        let seq: String = conn
            .query_row("SELECT sequence FROM task_sequence WHERE id = 1", [], |row| {
                row.get(0)
            })
            .expect("sequence row should still exist");
        assert_eq!(seq, "[]");
    }

    #[test]
    fn context_column_exists_after_upgrade() {
        let mut conn = fresh_conn();
        migrate(&mut conn).expect("migration should succeed");

        conn.execute(
            "INSERT INTO task (summary, active, created_at, updated_at, context)
             VALUES ('x', true, ?1, ?1, 'some notes')",
            params![Utc::now()],
        )
        .expect("insert with context should succeed");

        let context: Option<String> = conn
            .query_row("SELECT context FROM task WHERE summary = 'x'", [], |row| {
                row.get(0)
            })
            .expect("context should be readable");
        assert_eq!(context.as_deref(), Some("some notes"));
    }
}
