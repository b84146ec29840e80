use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension, Transaction};

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_init.sql",
    include_str!("../migrations/001_init.sql"),
)];

/// Applies every migration past the recorded version, all inside a single
/// transaction. Safe to run on every startup.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let installed = installed_version(&tx)?;

    let available = MIGRATIONS.len() as i64;
    if installed > available {
        return Err(StoreError::Migration(format!(
            "database schema {installed} is ahead of this build ({available})"
        )));
    }

    for (offset, (_name, sql)) in MIGRATIONS.iter().enumerate().skip(installed as usize) {
        tx.execute_batch(sql)?;
        record_version(&tx, (offset + 1) as i64)?;
    }

    tx.commit()?;
    Ok(())
}

/// Version recorded in `kartei_schema`, or 0 for a database that has never
/// been migrated.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    let tables: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kartei_schema';",
        [],
        |row| row.get(0),
    )?;
    if tables == 0 {
        return Ok(0);
    }

    let version: Option<i64> = conn
        .query_row("SELECT version FROM kartei_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version.unwrap_or(0))
}

/// Creates the version table when absent and seeds it with 0, so callers
/// always get a row back.
fn installed_version(tx: &Transaction<'_>) -> Result<i64> {
    tx.execute_batch("CREATE TABLE IF NOT EXISTS kartei_schema (version INTEGER NOT NULL);")?;

    let version: Option<i64> = tx
        .query_row("SELECT version FROM kartei_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    match version {
        Some(v) => Ok(v),
        None => {
            tx.execute("INSERT INTO kartei_schema (version) VALUES (0);", [])?;
            Ok(0)
        }
    }
}

fn record_version(tx: &Transaction<'_>, version: i64) -> Result<()> {
    let touched = tx.execute("UPDATE kartei_schema SET version = ?1;", [version])?;
    if touched != 1 {
        return Err(StoreError::Migration(format!(
            "schema table holds {touched} rows, expected exactly one"
        )));
    }
    Ok(())
}
