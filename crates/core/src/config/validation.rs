//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

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

fn check_origin(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, format!("unsupported scheme: {other}"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        for (field, value) in [
            ("cache_version", &self.cache_version),
            ("static_cache_prefix", &self.static_cache_prefix),
            ("api_cache_prefix", &self.api_cache_prefix),
            ("sync_tag", &self.sync_tag),
        ] {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        if self.static_cache_name() == self.api_cache_name() {
            return Err(invalid("api_cache_prefix", "static and API store names must differ"));
        }

        if !self.api_prefix.starts_with('/') || !self.api_prefix.ends_with('/') || self.api_prefix.len() < 2 {
            return Err(invalid("api_prefix", "must start and end with '/'"));
        }

        if let Some(pattern) = self.api_cache_patterns.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("api_cache_patterns", format!("pattern must start with '/': {pattern}")));
        }

        if let Some(path) = self.static_manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("static_manifest", format!("path must start with '/': {path}")));
        }

        if !self.root_document.starts_with('/') {
            return Err(invalid("root_document", "must start with '/'"));
        }

        check_origin("public_origin", &self.public_origin)?;
        check_origin("static_origin", &self.static_origin)?;
        check_origin("api_upstream", &self.api_upstream)?;

        if self.api_fallback_max_age_secs == Some(0) {
            tracing::warn!("api_fallback_max_age_secs is 0; cached API data will never be served offline");
        }

        Ok(())
    }
}
