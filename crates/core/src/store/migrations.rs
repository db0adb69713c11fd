//! Schema migrations, tracked with SQLite's `user_version`.
//!
//! Migration `n` (1-based) is applied inside a transaction that also bumps
//! `user_version` to `n`, so a failed step leaves the previous version intact.

use tokio_rusqlite::{Connection, rusqlite};

use crate::Error;

const MIGRATIONS: &[&str] = &[include_str!("../../migrations/001_preferences.sql")];

/// Apply every migration newer than the database's `user_version`.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| apply(conn, MIGRATIONS)).await.map_err(Error::from)
}

fn apply(conn: &mut rusqlite::Connection, migrations: &[&str]) -> Result<(), Error> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (version, sql) in (1i64..).zip(migrations).filter(|(version, _)| *version > current) {
        tracing::debug!(version, "applying preferences migration");

        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| Error::MigrationFailed(format!("migration {version}: {e}")))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}
