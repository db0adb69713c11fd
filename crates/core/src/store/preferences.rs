//! Key/value preference rows.

use super::connection::PreferenceDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl PreferenceDb {
    /// Get a stored preference value by key.
    ///
    /// Returns None if the key has never been written.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| {
                    row.get(0)
                });

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite a preference value.
    ///
    /// Last write wins; there is no versioning between writers.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![key, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let db = PreferenceDb::open_in_memory().await.unwrap();
        db.set_preference("theme", "light").await.unwrap();
        assert_eq!(db.get_preference("theme").await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = PreferenceDb::open_in_memory().await.unwrap();
        assert!(db.get_preference("theme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let db = PreferenceDb::open_in_memory().await.unwrap();
        db.set_preference("theme", "light").await.unwrap();
        db.set_preference("theme", "system").await.unwrap();

        assert_eq!(db.get_preference("theme").await.unwrap().as_deref(), Some("system"));

        let rows: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
