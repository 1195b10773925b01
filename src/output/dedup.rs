//! Process-wide result deduplication

use dashmap::DashSet;

/// Remembers every URL already written
///
/// Shared as an `Arc<Deduplicator>`; entries are never evicted.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: DashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time `url` is offered, false afterwards
    pub fn is_first_seen(&self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
