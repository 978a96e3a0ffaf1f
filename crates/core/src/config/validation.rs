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

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > 60_000 {
        return Err(invalid(field, "must not exceed 60000ms"));
    }
    Ok(())
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match url_scheme(value) {
        Some("http") | Some("https") => Ok(()),
        _ => Err(invalid(field, "must be an absolute http(s) URL")),
    }
}

fn url_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once("://")?;
    if rest.is_empty() { None } else { Some(scheme) }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - any timeout is below 100ms or above one minute
    /// - `cache_ttl_secs` is 0
    /// - `user_agent` is empty
    /// - a service URL is not absolute http(s)
    /// - a list limit is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        check_timeout("probe_timeout_ms", self.probe_timeout_ms)?;
        check_timeout("title_timeout_ms", self.title_timeout_ms)?;
        check_timeout("icon_timeout_ms", self.icon_timeout_ms)?;

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        check_http_url("favicon_service_url", &self.favicon_service_url)?;
        check_http_url("search_url", &self.search_url)?;
        check_http_url("image_search_url", &self.image_search_url)?;

        if self.max_favorites == 0 {
            return Err(invalid("max_favorites", "must be greater than 0"));
        }
        if self.max_recent == 0 {
            return Err(invalid("max_recent", "must be greater than 0"));
        }
        if self.max_top_sites == 0 {
            return Err(invalid("max_top_sites", "must be greater than 0"));
        }
        if self.recent_window_days <= 0 {
            return Err(invalid("recent_window_days", "must be greater than 0"));
        }

        if let Some(path) = &self.history_path
            && !path.exists()
        {
            tracing::warn!(path = %path.display(), "history_path does not exist; history features will fail");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_max_bytes_exceeds_limit() {
        let config = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_probe_timeout_too_small() {
        let config = AppConfig { probe_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "probe_timeout_ms"));
    }

    #[test]
    fn test_validate_title_timeout_too_large() {
        let config = AppConfig { title_timeout_ms: 60_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "title_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_service_url_scheme() {
        let config = AppConfig { favicon_service_url: "ftp://icons.example".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "favicon_service_url"));

        let config = AppConfig { search_url: "yandex.ru/search".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "search_url"));
    }

    #[test]
    fn test_validate_zero_limits() {
        let config = AppConfig { max_favorites: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_favorites"));

        let config = AppConfig { recent_window_days: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "recent_window_days"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, probe_timeout_ms: 100, title_timeout_ms: 60_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
