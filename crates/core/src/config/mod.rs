//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MOMENTUM_*)
//! 2. TOML config file (if MOMENTUM_CONFIG_FILE set)
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

/// Files required for the app to run fully offline.
pub const DEFAULT_ASSETS: [&str; 8] = [
    "./",
    "./index.html",
    "./styles.css",
    "./app.js",
    "./manifest.webmanifest",
    "./icon-192.png",
    "./icon-512.png",
    "./apple-touch-icon.png",
];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MOMENTUM_*)
/// 2. TOML config file (if MOMENTUM_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding caches and records.
    ///
    /// Set via MOMENTUM_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL the app's static assets are served from.
    ///
    /// Manifest paths and fetched paths resolve against it.
    /// Set via MOMENTUM_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Version tag naming the current asset cache.
    ///
    /// Changing it is the only trigger for a cache upgrade.
    /// Set via MOMENTUM_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Asset manifest precached on install, in order.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Shell page served when the network is unreachable.
    ///
    /// Must be listed in `assets`.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether to register the offline cache controller at startup.
    ///
    /// Set via MOMENTUM_OFFLINE_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub offline_enabled: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./momentum.sqlite")
}

fn default_scope() -> String {
    "http://127.0.0.1:8080/".into()
}

fn default_cache_version() -> String {
    "cm6-v1".into()
}

fn default_assets() -> Vec<String> {
    DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_shell() -> String {
    "./index.html".into()
}

fn default_user_agent() -> String {
    "momentum/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scope: default_scope(),
            cache_version: default_cache_version(),
            assets: default_assets(),
            shell: default_shell(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            offline_enabled: true,
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
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MOMENTUM_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MOMENTUM_")
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

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./momentum.sqlite"));
        assert_eq!(config.scope, "http://127.0.0.1:8080/");
        assert_eq!(config.cache_version, "cm6-v1");
        assert_eq!(config.assets.len(), 8);
        assert_eq!(config.assets[0], "./");
        assert_eq!(config.shell, "./index.html");
        assert_eq!(config.user_agent, "momentum/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.offline_enabled);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MOMENTUM_CACHE_VERSION", "cm6-v2");
            jail.set_env("MOMENTUM_OFFLINE_ENABLED", "false");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_version, "cm6-v2");
            assert!(!config.offline_enabled);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "momentum.toml",
                r#"
                scope = "https://momentum.example/app/"
                assets = ["./", "./index.html"]
                "#,
            )?;
            jail.set_env("MOMENTUM_CONFIG_FILE", "momentum.toml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.scope, "https://momentum.example/app/");
            assert_eq!(config.assets, vec!["./".to_string(), "./index.html".to_string()]);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MOMENTUM_SCOPE", "ftp://momentum.example/");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
