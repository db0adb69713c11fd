//! Database connection management with pragma configuration.
//!
//! Opens the SQLite file that backs persisted preferences, applies the WAL
//! pragmas, and runs migrations.

use super::migrations;
use crate::{AppConfig, Error};
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA temp_store=MEMORY;";

/// Preference database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct PreferenceDb {
    pub(crate) conn: Connection,
}

impl PreferenceDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Storage(e.into()))?;
        Self::prepare(conn).await
    }

    /// Open the database at the configured `preferences_path`.
    pub async fn open_configured(config: &AppConfig) -> Result<Self, Error> {
        tracing::debug!(path = %config.preferences_path.display(), "opening preference database");
        Self::open(&config.preferences_path).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Storage)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = PreferenceDb::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_open_file_survives_reopen() {
        let path = std::env::temp_dir().join(format!("finboard-prefs-{}.sqlite", std::process::id()));
        {
            let db = PreferenceDb::open(&path).await.unwrap();
            db.set_preference("theme", "dark").await.unwrap();
        }
        let config = AppConfig { preferences_path: path.clone(), ..Default::default() };
        let db = PreferenceDb::open_configured(&config).await.unwrap();
        assert_eq!(db.get_preference("theme").await.unwrap().as_deref(), Some("dark"));
        drop(db);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
