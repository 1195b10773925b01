//! Scheduler for managing one session's crawl frontier
//!
//! This module handles:
//! - The FIFO frontier of `(URL, depth)` pairs waiting to be fetched
//! - The visited set, so a URL is fetched at most once per session
//! - Admission rules: scheme, scope, depth
//! - The worker budget via a semaphore

use crate::url::ScopeRule;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL queued for fetching at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Distance from the seed (the seed is depth 0)
    pub depth: u32,
}

/// A scheduled fetch with a semaphore permit
///
/// The permit is released when the fetch is dropped, freeing a worker slot.
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: QueuedUrl,

    /// The semaphore permit for this fetch
    pub _permit: OwnedSemaphorePermit,
}

/// Why a candidate was not admitted to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not an http(s) URL
    Scheme,
    /// Host outside the session scope
    OutOfScope,
    /// Deeper than the configured maximum
    TooDeep,
    /// Already admitted earlier in this session
    Visited,
}

/// Scheduler manages the frontier queue and the worker budget
///
/// The scheduler coordinates:
/// - Admission of candidates (scheme, scope, depth, visited)
/// - FIFO order of pending URLs
/// - Concurrency limits (at most `threads` fetches in flight)
pub struct Scheduler {
    /// Semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Worker budget the semaphore was created with
    threads: usize,

    /// Pending URLs
    frontier: VecDeque<QueuedUrl>,

    /// Every URL ever admitted in this session
    visited: HashSet<String>,

    /// Session scope
    scope: ScopeRule,

    /// Maximum admitted depth
    max_depth: u32,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `scope` - The session's scope rule
    /// * `max_depth` - Deepest frontier depth that may be fetched
    /// * `threads` - Number of fetches allowed in flight (at least 1)
    pub fn new(scope: ScopeRule, max_depth: u32, threads: usize) -> Self {
        let threads = threads.max(1);

        Self {
            semaphore: Arc::new(Semaphore::new(threads)),
            threads,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            scope,
            max_depth,
        }
    }

    /// Offers a candidate to the frontier
    ///
    /// A URL is admitted only if it is http(s), its host is in scope, its
    /// depth does not exceed the maximum, and it was never admitted before.
    pub fn add_to_frontier(&mut self, url: Url, depth: u32) -> Result<(), Rejection> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Rejection::Scheme);
        }

        if !self.scope.allows(&url) {
            return Err(Rejection::OutOfScope);
        }

        if depth > self.max_depth {
            return Err(Rejection::TooDeep);
        }

        if !self.visited.insert(url.as_str().to_string()) {
            return Err(Rejection::Visited);
        }

        tracing::trace!("Queued {} at depth {}", url, depth);
        self.frontier.push_back(QueuedUrl { url, depth });
        Ok(())
    }

    /// Gets the next URL to fetch, if a worker slot is free
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - A URL and the permit for its worker slot
    /// * `None` - The frontier is empty or every slot is taken
    pub fn next_url(&mut self) -> Option<ScheduledFetch> {
        if self.frontier.is_empty() {
            return None;
        }

        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        let url = self.frontier.pop_front()?;

        Some(ScheduledFetch {
            url,
            _permit: permit,
        })
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns how many URLs were admitted in this session
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns how many fetches currently hold a worker slot
    pub fn in_flight(&self) -> usize {
        self.threads - self.semaphore.available_permits()
    }

    /// Returns the session scope
    pub fn scope(&self) -> &ScopeRule {
        &self.scope
    }
}
