use crate::config::types::{Config, CrawlerConfig, FetcherConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages_per_domain < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_domain must be >= 1, got {}",
            config.max_pages_per_domain
        )));
    }

    if config.max_contacts_per_domain < 1 {
        return Err(ConfigError::Validation(format!(
            "max_contacts_per_domain must be >= 1, got {}",
            config.max_contacts_per_domain
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 16, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.max_concurrent_renders < 1
        || config.max_concurrent_renders > config.max_concurrent_fetches
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_renders must be between 1 and max_concurrent_fetches ({}), got {}",
            config.max_concurrent_fetches, config.max_concurrent_renders
        )));
    }

    if config.max_concurrent_domains < 1 || config.max_concurrent_domains > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_domains must be between 1 and 64, got {}",
            config.max_concurrent_domains
        )));
    }

    for path in &config.priority_paths {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidUrl(format!(
                "priority path '{}' must start with '/'",
                path
            )));
        }
    }

    if config.priority_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "priority_keywords cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.static_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "static_timeout_secs must be >= 1, got {}",
            config.static_timeout_secs
        )));
    }

    if config.rendered_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "rendered_timeout_secs must be >= 1, got {}",
            config.rendered_timeout_secs
        )));
    }

    if let Some(path) = &config.chrome_executable {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be an empty string".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if matches!(config.database_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.summary_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
