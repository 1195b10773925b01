//! Wraith: a scoped, depth-bounded link crawler
//!
//! This crate reads seed URLs, crawls each one within a host scope and depth
//! limit under a bounded worker budget and a per-seed timeout, and streams
//! every discovered link, script source and form action with its provenance.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Wraith operations
#[derive(Debug, Error)]
pub enum WraithError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Archive lookup failed: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("headers flag not formatted properly (no colon to separate header and value): {0}")]
    MalformedHeader(String),

    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    #[error("No URLs detected. Hint: cat urls.txt | wraith")]
    NoInput,
}

/// Seed URL errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Input must be a valid absolute URL: {0}")]
    NotAbsolute(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Unable to validate URL: {0}")]
    SchemeProbeFailed(String),
}

/// Result type alias for Wraith operations
pub type Result<T> = std::result::Result<T, WraithError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{LinkRecord, SourceKind};
pub use url::{ScopeRule, Seed};
