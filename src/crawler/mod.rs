//! Crawler module for seed-by-seed link discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - HTML and JavaScript link extraction
//! - Per-session frontier scheduling under a worker budget
//! - Session traversal with a soft timeout
//! - Supervision of sessions across the seed stream

mod fetcher;
mod parser;
mod record;
mod scheduler;
mod session;
mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{build_http_client, FetchResult, HttpFetcher, PageFetch, PageFetcher, MAX_REDIRECTS};
pub use parser::{extract, ExtractOptions, Extraction};
pub use record::{LinkRecord, SourceKind};
pub use scheduler::{QueuedUrl, Rejection, ScheduledFetch, Scheduler};
pub use session::{validate_seed, CrawlSession, SessionOutcome, SessionStats};
pub use supervisor::{Supervisor, SupervisorReport};
