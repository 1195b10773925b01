use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Separator between header pairs in the `-h` flag
pub const HEADER_SEPARATOR: &str = ";;";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wraith::config::load_config;
///
/// let config = load_config(Path::new("wraith.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Parses the raw `-h` header string into a name/value map
///
/// Pairs are separated by `;;` and each pair is split on its first colon.
/// Names and values are trimmed. A later pair with the same name wins.
///
/// # Examples
///
/// ```
/// use wraith::config::parse_headers;
///
/// let headers = parse_headers("Cookie: foo=bar;;Referer: http://example.com/").unwrap();
/// assert_eq!(headers["Cookie"], "foo=bar");
/// assert_eq!(headers["Referer"], "http://example.com/");
/// ```
pub fn parse_headers(raw: &str) -> ConfigResult<BTreeMap<String, String>> {
    let mut headers = BTreeMap::new();

    if raw.trim().is_empty() {
        return Ok(headers);
    }

    for pair in raw.split(HEADER_SEPARATOR) {
        let (name, value) = pair
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedHeader(pair.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::MalformedHeader(pair.to_string()));
        }

        headers.insert(name.to_string(), value.trim().to_string());
    }

    Ok(headers)
}
