//! Crawl supervisor - drives one session per input seed
//!
//! The supervisor owns the producer side of the output channel. It reads
//! seeds line by line, validates them, optionally expands them through the
//! web archive, and runs the sessions strictly one after another. Per-seed
//! failures are logged and skipped; only an archive failure or an unreadable
//! seed stream stops the run.

use crate::archive::ArchiveClient;
use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::record::LinkRecord;
use crate::crawler::session::{validate_seed, CrawlSession, SessionOutcome};
use crate::url::{ScopeRule, Seed};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Non-blank input lines
    pub seeds_read: usize,
    /// Input lines that failed validation
    pub seeds_skipped: usize,
    /// Sessions that drained their frontier
    pub sessions_completed: usize,
    /// Sessions stopped by the timeout
    pub sessions_timed_out: usize,
    /// Records sent to the output channel
    pub records_emitted: usize,
}

impl SupervisorReport {
    fn record(&mut self, outcome: SessionOutcome) {
        match outcome {
            SessionOutcome::Completed(_) => self.sessions_completed += 1,
            SessionOutcome::TimedOut(_) => self.sessions_timed_out += 1,
        }
        self.records_emitted += outcome.stats().records_emitted;
    }
}

/// Runs crawl sessions for a stream of seeds
pub struct Supervisor {
    crawler: CrawlerConfig,
    host_override: Option<String>,
    fetcher: Arc<dyn PageFetcher>,
    archive: Option<ArchiveClient>,
}

impl Supervisor {
    /// Creates a supervisor
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fetcher` - Transport shared by every session
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            crawler: config.crawler.clone(),
            host_override: config.http.host_override(),
            fetcher,
            archive: None,
        }
    }

    /// Expands every seed with the URLs the archive knows under its host
    pub fn with_archive(mut self, archive: ArchiveClient) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Crawls every seed read from `seeds`
    ///
    /// `results` is dropped when the seed stream is exhausted, which closes
    /// the channel once the last session's workers are done with it.
    ///
    /// # Returns
    ///
    /// * `Ok(SupervisorReport)` - Every seed was processed
    /// * `Err(WraithError)` - The archive lookup failed or the seed stream
    ///   could not be read
    pub async fn run<R>(
        &self,
        seeds: R,
        results: mpsc::Sender<LinkRecord>,
    ) -> crate::Result<SupervisorReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut report = SupervisorReport::default();
        let mut lines = seeds.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            report.seeds_read += 1;

            let seed = match validate_seed(line, self.fetcher.as_ref()).await {
                Ok(seed) => seed,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", line, e);
                    report.seeds_skipped += 1;
                    continue;
                }
            };

            if let Some(archive) = &self.archive {
                for archived in archive.lookup(&seed.host).await? {
                    match Seed::parse(&archived) {
                        Ok(archived) => {
                            let outcome = self.crawl(archived, &results).await;
                            report.record(outcome);
                        }
                        Err(e) => tracing::debug!("Ignoring archived URL {}: {}", archived, e),
                    }
                }
            }

            let outcome = self.crawl(seed, &results).await;
            report.record(outcome);
        }

        tracing::info!(
            "Run finished: {} seeds read, {} skipped, {} sessions completed, {} timed out, {} records",
            report.seeds_read,
            report.seeds_skipped,
            report.sessions_completed,
            report.sessions_timed_out,
            report.records_emitted
        );

        Ok(report)
    }

    async fn crawl(&self, seed: Seed, results: &mpsc::Sender<LinkRecord>) -> SessionOutcome {
        let scope = ScopeRule::resolve(
            &seed.host,
            self.crawler.include_subdomains,
            self.host_override.as_deref(),
        );

        CrawlSession::new(
            seed,
            scope,
            &self.crawler,
            self.fetcher.clone(),
            results.clone(),
        )
        .run()
        .await
    }
}
