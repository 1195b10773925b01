//! Crawl session - one seed's traversal
//!
//! A session owns its scheduler (frontier, visited set, worker budget) and
//! drives fetch workers until the frontier drains or the session timer fires:
//! - Workers fetch a page, extract it, and send records to the output
//!   channel as soon as they are found
//! - Follow candidates come back to the session loop, which offers them to
//!   the frontier one level deeper
//! - On timeout no further URLs are dispatched; workers already running are
//!   detached rather than aborted, and drop their remaining records

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::parser::{extract, ExtractOptions};
use crate::crawler::record::LinkRecord;
use crate::crawler::scheduler::{ScheduledFetch, Scheduler};
use crate::url::{ScopeRule, Seed};
use crate::{UrlError, UrlResult};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Pages fetched and extracted
    pub pages_fetched: usize,
    /// Fetches that produced no page
    pub pages_failed: usize,
    /// Records sent to the output channel
    pub records_emitted: usize,
}

/// Terminal state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The frontier drained with no fetches in flight
    Completed(SessionStats),
    /// The session timer fired first
    TimedOut(SessionStats),
}

impl SessionOutcome {
    pub fn stats(&self) -> SessionStats {
        match self {
            SessionOutcome::Completed(stats) | SessionOutcome::TimedOut(stats) => *stats,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, SessionOutcome::TimedOut(_))
    }
}

/// Turns a raw input line into a seed
///
/// Inputs with an http(s) scheme are parsed directly. For anything else the
/// fetcher probes `http://` first and `https://` second; the first that gets
/// any HTTP response wins.
///
/// # Returns
///
/// * `Ok(Seed)` - A usable seed
/// * `Err(UrlError)` - Unparseable input, or both probes failed
pub async fn validate_seed(raw: &str, fetcher: &dyn PageFetcher) -> UrlResult<Seed> {
    let raw = raw.trim();

    if Seed::has_scheme(raw) {
        return Seed::parse(raw);
    }

    for candidate in Seed::scheme_candidates(raw) {
        let seed = match Seed::parse(&candidate) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::debug!("Candidate {} is not a valid URL: {}", candidate, e);
                continue;
            }
        };

        if fetcher.probe(&seed.url).await {
            return Ok(seed);
        }
    }

    Err(UrlError::SchemeProbeFailed(raw.to_string()))
}

/// State shared by every fetch worker of one session
struct Worker {
    fetcher: Arc<dyn PageFetcher>,
    scope: ScopeRule,
    options: ExtractOptions,
    results: mpsc::Sender<LinkRecord>,
    /// Set once the session has ended; guards every send so no record
    /// reaches the channel after that point
    expired: RwLock<bool>,
}

/// What one worker reports back to the session loop
struct PageOutcome {
    depth: u32,
    follow: Vec<Url>,
    emitted: usize,
    fetched: bool,
}

impl PageOutcome {
    fn failed(depth: u32) -> Self {
        Self {
            depth,
            follow: Vec::new(),
            emitted: 0,
            fetched: false,
        }
    }
}

/// A single seed's crawl
pub struct CrawlSession {
    seed: Seed,
    scheduler: Scheduler,
    timeout: Option<Duration>,
    worker: Arc<Worker>,
}

impl CrawlSession {
    /// Creates a session for a validated seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The validated seed
    /// * `scope` - The scope rule governing every fetch of this session
    /// * `config` - Depth, worker budget, timeout and extraction switches
    /// * `fetcher` - The transport
    /// * `results` - Producer side of the shared output channel
    pub fn new(
        seed: Seed,
        scope: ScopeRule,
        config: &CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
        results: mpsc::Sender<LinkRecord>,
    ) -> Self {
        let options = ExtractOptions {
            crawl_js: config.crawl_js,
            inside_only: config.inside_only,
            seed: seed.text.clone(),
        };

        let scheduler = Scheduler::new(scope.clone(), config.max_depth, config.threads as usize);

        Self {
            seed,
            scheduler,
            timeout: config.session_timeout(),
            worker: Arc::new(Worker {
                fetcher,
                scope,
                options,
                results,
                expired: RwLock::new(false),
            }),
        }
    }

    /// Runs the session to a terminal state
    pub async fn run(mut self) -> SessionOutcome {
        tracing::info!("Crawling {} (scope: {})", self.seed.text, self.scheduler.scope());

        let mut stats = SessionStats::default();
        let mut workers: JoinSet<PageOutcome> = JoinSet::new();

        if let Err(rejection) = self.scheduler.add_to_frontier(self.seed.url.clone(), 0) {
            tracing::warn!("Seed {} not crawlable: {:?}", self.seed.text, rejection);
            return SessionOutcome::Completed(stats);
        }

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let timer = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(timer);

        loop {
            while let Some(scheduled) = self.scheduler.next_url() {
                workers.spawn(process_url(self.worker.clone(), scheduled));
            }

            if workers.is_empty() {
                break;
            }

            tokio::select! {
                _ = &mut timer => {
                    tracing::warn!("[timeout] {}", self.seed.text);
                    *self
                        .worker
                        .expired
                        .write()
                        .unwrap_or_else(PoisonError::into_inner) = true;
                    tracing::debug!(
                        "Detaching {} in-flight fetches, dropping {} queued URLs",
                        workers.len(),
                        self.scheduler.frontier_size()
                    );
                    workers.detach_all();
                    return SessionOutcome::TimedOut(stats);
                }
                joined = workers.join_next() => match joined {
                    Some(Ok(outcome)) => self.absorb(outcome, &mut stats),
                    Some(Err(e)) => {
                        stats.pages_failed += 1;
                        tracing::error!("Fetch worker for {} failed: {}", self.seed.text, e);
                    }
                    None => {}
                },
            }
        }

        tracing::info!(
            "Finished {}: {} pages fetched, {} failed, {} records",
            self.seed.text,
            stats.pages_fetched,
            stats.pages_failed,
            stats.records_emitted
        );

        SessionOutcome::Completed(stats)
    }

    /// Folds a worker's outcome into the session
    fn absorb(&mut self, outcome: PageOutcome, stats: &mut SessionStats) {
        if outcome.fetched {
            stats.pages_fetched += 1;
        } else {
            stats.pages_failed += 1;
        }
        stats.records_emitted += outcome.emitted;

        for url in outcome.follow {
            if let Err(rejection) = self.scheduler.add_to_frontier(url, outcome.depth + 1) {
                tracing::trace!("Not following candidate: {:?}", rejection);
            }
        }
    }
}

/// Fetches and extracts one page
///
/// The worker slot is held until this returns.
async fn process_url(worker: Arc<Worker>, scheduled: ScheduledFetch) -> PageOutcome {
    let url = &scheduled.url.url;
    let depth = scheduled.url.depth;

    tracing::debug!("Fetching {} (depth {})", url, depth);

    let page = match worker.fetcher.fetch(url).await {
        FetchResult::Success(page) => page,
        FetchResult::HttpError { status_code } => {
            tracing::debug!("HTTP {} for {}", status_code, url);
            return PageOutcome::failed(depth);
        }
        FetchResult::NetworkError { error } => {
            tracing::debug!("Failed to fetch {}: {}", url, error);
            return PageOutcome::failed(depth);
        }
    };

    if !worker.scope.allows(&page.url) {
        tracing::debug!("{} redirected out of scope to {}", url, page.url);
        return PageOutcome::failed(depth);
    }

    let extraction = extract(&page, &worker.options);

    let mut emitted = 0;
    for record in extraction.records {
        // Wait for channel capacity first, then decide under the lock
        let Ok(slot) = worker.results.reserve().await else {
            tracing::debug!("Output channel closed, dropping records from {}", page.url);
            break;
        };

        let sent = {
            let expired = worker
                .expired
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if *expired {
                false
            } else {
                slot.send(record);
                true
            }
        };

        if !sent {
            tracing::debug!("Session expired, dropping records from {}", page.url);
            break;
        }
        emitted += 1;
    }

    PageOutcome {
        depth,
        follow: extraction.follow,
        emitted,
        fetched: true,
    }
}
