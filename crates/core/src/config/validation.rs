//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `scope` is not an absolute http(s) URL
    /// - `cache_version` is blank
    /// - `assets` is empty or does not list `shell`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scope = url::Url::parse(&self.scope).map_err(|e| invalid("scope", e.to_string()))?;
        if !matches!(scope.scheme(), "http" | "https") {
            return Err(invalid("scope", format!("unsupported scheme: {}", scope.scheme())));
        }
        if !self.scope.ends_with('/') {
            tracing::warn!(scope = %self.scope, "scope has no trailing slash; relative assets resolve against its parent");
        }

        if self.cache_version.trim().is_empty() {
            return Err(invalid("cache_version", "must not be empty"));
        }

        if self.assets.is_empty() {
            return Err(invalid("assets", "must list at least one asset"));
        }
        if !self.assets.iter().any(|a| a == &self.shell) {
            return Err(invalid("shell", format!("{} is not listed in assets", self.shell)));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        Ok(())
    }
}
