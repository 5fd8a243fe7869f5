use crate::config::types::{ClassifierConfig, Config, CrawlConfig, RequestConfig, StoreBackend, StoreConfig};
use crate::url::normalize_url;
use crate::ConfigError;
use reqwest::header::HeaderName;
use url::Url;

/// Upper bound on concurrent crawl workers
const MAX_WORKERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_request_config(&config.request)?;
    validate_store_config(&config.store)?;
    validate_classifier_config(&config.classifier)?;
    Ok(())
}

/// Validates crawl loop configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    normalize_url(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.max_run_seconds == Some(0) {
        return Err(ConfigError::Validation(
            "max_run_seconds must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates outgoing request configuration
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be >= 1".to_string(),
        ));
    }

    for name in config.headers.keys() {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid header name '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Validates content store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.backend != StoreBackend::Memory && config.location.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store location cannot be empty".to_string(),
        ));
    }

    if config.prefix.starts_with('/') || config.prefix.contains("..") {
        return Err(ConfigError::Validation(format!(
            "store prefix must be relative, got '{}'",
            config.prefix
        )));
    }

    Ok(())
}

/// Validates classifier endpoint identity
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid classifier endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Classifier endpoint must use http or https, got '{}'",
            config.endpoint
        )));
    }

    for (field, value) in [
        ("agent_id", &config.agent_id),
        ("region", &config.region),
        ("topic", &config.topic),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty",
                field
            )));
        }
    }

    if config.max_input_chars == 0 {
        return Err(ConfigError::Validation(
            "max_input_chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}
