use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Xtream section exists (enforced by serde)
/// - Server port is not 0
/// - Remote endpoints carry an http(s) scheme
/// - Credentials and timeouts are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.xtream.username.is_empty() {
        return Err(ConfigError::ValidationError(
            "xtream.username cannot be empty".to_string(),
        ));
    }

    for (key, url) in [
        ("xtream.host", config.xtream.host.as_str()),
        ("search_index.url", config.search_index.url.as_str()),
        ("downloader.host", config.downloader.host.as_str()),
    ] {
        if !has_http_scheme(url) {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with http:// or https:// (got {:?})",
                key, url
            )));
        }
    }

    for (key, secs) in [
        ("xtream.timeout_secs", config.xtream.timeout_secs),
        ("search_index.timeout_secs", config.search_index.timeout_secs),
        (
            "search_index.task_timeout_secs",
            config.search_index.task_timeout_secs,
        ),
        ("downloader.timeout_secs", config.downloader.timeout_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                key
            )));
        }
    }

    if config.search_index.task_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search_index.task_poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
