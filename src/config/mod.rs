//! Configuration module for Wraith
//!
//! Configuration comes from an optional TOML file and the command-line
//! flags, which override the file. Both paths end in the same validation.
//!
//! # Example
//!
//! ```no_run
//! use wraith::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wraith.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, DEFAULT_ARCHIVE_ENDPOINT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_headers, HEADER_SEPARATOR};
pub use validation::validate;
