//! Web archive seed augmentation
//!
//! Queries a CDX index (the Wayback Machine by default) for every archived
//! URL under a host, so those URLs can be crawled as extra seeds.

use reqwest::Client;
use thiserror::Error;

/// Errors from the archive lookup
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Archive returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Client for a CDX search endpoint
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    endpoint: String,
}

impl ArchiveClient {
    /// Creates an archive client
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client to issue the lookup with
    /// * `endpoint` - CDX search URL, e.g. `http://web.archive.org/cdx/search/cdx`
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns every archived URL recorded under `host` and its subdomains
    ///
    /// Only captures that returned HTTP 200 are listed, collapsed by URL key.
    pub async fn lookup(&self, host: &str) -> Result<Vec<String>, ArchiveError> {
        let pattern = format!("*.{}", host);
        tracing::info!("Querying archive for {}", pattern);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", pattern.as_str()),
                ("collapse", "urlkey"),
                ("filter", "statuscode:200"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.text().await?;
        let urls = parse_cdx(&body);
        tracing::info!("Archive returned {} URLs for {}", urls.len(), host);

        Ok(urls)
    }
}

/// Extracts the original-URL column from a plain CDX response
///
/// CDX lines are `urlkey timestamp original mimetype statuscode digest length`.
/// Lines with fewer than three fields are ignored.
pub fn parse_cdx(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.split_whitespace().nth(2))
        .map(str::to_string)
        .collect()
}
