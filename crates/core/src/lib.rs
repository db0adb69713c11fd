//! Core types and shared functionality for finboard.
//!
//! This crate provides:
//! - Layered application configuration
//! - Persisted preference storage with a SQLite backend
//! - The theme preference manager
//! - Unified error types

pub mod config;
pub mod error;
pub mod store;
pub mod theme;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use store::{MemoryStore, PreferenceDb, PreferenceStore};
pub use theme::{Appearance, ClassList, RootClasses, SystemColorScheme, ThemeManager, ThemePreference};
