//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FINBOARD_*)
//! 2. TOML config file (if FINBOARD_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Production API host used when `FINBOARD_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "https://api.finboard.com.br";

/// Public postal-code lookup service.
pub const DEFAULT_CEP_BASE_URL: &str = "https://viacep.com.br/ws";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FINBOARD_*)
/// 2. TOML config file (if FINBOARD_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL every `/api/...` path is resolved against.
    ///
    /// Set via FINBOARD_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the postal-code (CEP) lookup service.
    ///
    /// Set via FINBOARD_CEP_BASE_URL environment variable.
    #[serde(default = "default_cep_base_url")]
    pub cep_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via FINBOARD_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FINBOARD_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Path to the SQLite file holding persisted preferences.
    ///
    /// Set via FINBOARD_PREFERENCES_PATH environment variable.
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

fn default_cep_base_url() -> String {
    DEFAULT_CEP_BASE_URL.into()
}

fn default_user_agent() -> String {
    "finboard/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("./finboard-preferences.sqlite")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cep_base_url: default_cep_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            preferences_path: default_preferences_path(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FINBOARD_`
    /// 2. TOML file from `FINBOARD_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FINBOARD_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FINBOARD_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://api.finboard.com.br");
        assert_eq!(config.cep_base_url, "https://viacep.com.br/ws");
        assert_eq!(config.user_agent, "finboard/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.preferences_path, PathBuf::from("./finboard-preferences.sqlite"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_defaults_when_unset() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_base_url() {
        Jail::expect_with(|jail| {
            jail.set_env("FINBOARD_API_BASE_URL", "https://staging.finboard.com.br");
            jail.set_env("FINBOARD_TIMEOUT_MS", "5000");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.api_base_url, "https://staging.finboard.com.br");
            assert_eq!(config.timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_layer() {
        Jail::expect_with(|jail| {
            jail.create_file("finboard.toml", r#"user_agent = "finboard-test/1.0""#)?;
            jail.set_env("FINBOARD_CONFIG_FILE", "finboard.toml");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.user_agent, "finboard-test/1.0");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_env_url_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("FINBOARD_API_BASE_URL", "not a url");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
            Ok(())
        });
    }
}
