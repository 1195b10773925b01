use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default Wayback Machine CDX endpoint
pub const DEFAULT_ARCHIVE_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";

/// Main configuration structure for Wraith
///
/// Every section is optional in the TOML file; missing keys take the same
/// defaults as the command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub archive: ArchiveConfig,
}

/// Crawl session behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent fetches within one session
    pub threads: u32,

    /// Maximum frontier depth (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Per-seed wall-clock budget in seconds, -1 for unlimited
    pub timeout: i64,

    /// Only follow links that contain the seed URL
    #[serde(rename = "inside-only")]
    pub inside_only: bool,

    /// Treat every subdomain of the seed host as in scope
    #[serde(rename = "include-subdomains")]
    pub include_subdomains: bool,

    /// Follow script sources and scan `.js` bodies for URLs
    #[serde(rename = "crawl-js")]
    pub crawl_js: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            threads: 16,
            max_depth: 4,
            timeout: 360,
            inside_only: false,
            include_subdomains: false,
            crawl_js: false,
        }
    }
}

impl CrawlerConfig {
    /// Returns the session timeout, or `None` when it is disabled
    pub fn session_timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout).ok().map(Duration::from_secs)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Page size limit in KB, -1 for unlimited
    #[serde(rename = "max-size-kb")]
    pub max_size_kb: i64,

    /// Skip TLS certificate verification
    pub insecure: bool,

    /// Custom request headers sent with every crawl request
    pub headers: BTreeMap<String, String>,

    /// Outbound proxy URL
    pub proxy: Option<String>,

    /// Treat redirect responses as final instead of following them
    #[serde(rename = "disable-redirects")]
    pub disable_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_size_kb: -1,
            insecure: false,
            headers: BTreeMap::new(),
            proxy: None,
            disable_redirects: false,
        }
    }
}

impl HttpConfig {
    /// Returns the body size cap in bytes, or `None` when unlimited
    pub fn body_limit(&self) -> Option<usize> {
        usize::try_from(self.max_size_kb)
            .ok()
            .map(|kb| kb.saturating_mul(1024))
    }

    /// Returns the host named by a custom `Host` header, without its port
    pub fn host_override(&self) -> Option<String> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
            .map(|(_, value)| crate::url::strip_port(value.trim()).to_lowercase())
            .filter(|host| !host.is_empty())
    }
}

/// Output presentation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit one JSON object per line instead of plain text
    pub json: bool,

    /// Append `[source: <kind>]` to plain lines
    #[serde(rename = "show-source")]
    pub show_source: bool,

    /// Append `[from: <origin>]` to plain lines
    #[serde(rename = "show-where")]
    pub show_where: bool,

    /// Suppress URLs already written during this run
    pub unique: bool,
}

/// Archive seed augmentation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Query the archive for every seed host and crawl the results first
    pub enabled: bool,

    /// CDX search endpoint
    pub endpoint: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_ARCHIVE_ENDPOINT.to_string(),
        }
    }
}
