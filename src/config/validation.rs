use crate::config::types::{ArchiveConfig, Config, CrawlerConfig, HttpConfig};
use crate::{ConfigError, ConfigResult};
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_archive_config(&config.archive)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.threads < 1 {
        return Err(ConfigError::Validation(format!(
            "threads must be >= 1, got {}",
            config.threads
        )));
    }

    if config.timeout == 0 || config.timeout < -1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be -1 (unlimited) or a positive number of seconds, got {}",
            config.timeout
        )));
    }

    Ok(())
}

/// Validates HTTP transport configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.max_size_kb == 0 || config.max_size_kb < -1 {
        return Err(ConfigError::Validation(format!(
            "max_size_kb must be -1 (unlimited) or a positive number of KB, got {}",
            config.max_size_kb
        )));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::MalformedHeader(format!("invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::MalformedHeader(format!("invalid value for header '{}'", name))
        })?;
    }

    if let Some(proxy) = &config.proxy {
        validate_proxy(proxy)?;
    }

    Ok(())
}

/// Validates archive configuration
fn validate_archive_config(config: &ArchiveConfig) -> ConfigResult<()> {
    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::Validation(format!("Invalid archive endpoint '{}': {}", config.endpoint, e))
    })?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Archive endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    Ok(())
}

/// Validates a proxy URL
fn validate_proxy(proxy: &str) -> ConfigResult<()> {
    let url = Url::parse(proxy).map_err(|e| ConfigError::InvalidProxy(format!("'{}': {}", proxy, e)))?;

    match url.scheme() {
        "http" | "https" | "socks5" | "socks5h" => {}
        other => {
            return Err(ConfigError::InvalidProxy(format!(
                "'{}': unsupported scheme '{}'",
                proxy, other
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidProxy(format!("'{}': missing host", proxy)));
    }

    Ok(())
}
