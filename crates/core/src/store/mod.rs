//! Durable client-side storage for user preferences.
//!
//! - [`PreferenceStore`] is the seam the theme manager writes through.
//! - [`PreferenceDb`] persists to SQLite (WAL mode, versioned migrations).
//! - [`MemoryStore`] keeps values for the current process only.

pub mod connection;
pub mod migrations;
pub mod preferences;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

pub use connection::PreferenceDb;

use crate::Error;

/// Read/write access to persisted preference values.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

#[async_trait]
impl PreferenceStore for PreferenceDb {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.get_preference(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.set_preference(key, value).await
    }
}

/// Process-local preference store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.values.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
