// MockFetcher - in-memory PageFetcher for session and supervisor tests
//
// Pages are keyed by their normalized URL string. Unknown URLs answer 404.

use crate::crawler::fetcher::{FetchResult, PageFetch, PageFetcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
enum MockPage {
    Body {
        final_url: Url,
        content_type: &'static str,
        body: String,
    },
    Status(u16),
    Hang,
}

#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, MockPage>,
    reachable: HashSet<String>,
    delay: Option<Duration>,
    fetched: Mutex<Vec<String>>,
    probed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn key(url: &str) -> String {
    Url::parse(url).unwrap().to_string()
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(
            key(url),
            MockPage::Body {
                final_url: Url::parse(url).unwrap(),
                content_type: "text/html; charset=utf-8",
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_script(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(
            key(url),
            MockPage::Body {
                final_url: Url::parse(url).unwrap(),
                content_type: "application/javascript",
                body: body.to_string(),
            },
        );
        self
    }

    /// Answers `url` with an HTML page that claims to live at `final_url`
    pub fn with_redirect(mut self, url: &str, final_url: &str, body: &str) -> Self {
        self.pages.insert(
            key(url),
            MockPage::Body {
                final_url: Url::parse(final_url).unwrap(),
                content_type: "text/html",
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_status(mut self, url: &str, status_code: u16) -> Self {
        self.pages.insert(key(url), MockPage::Status(status_code));
        self
    }

    /// A fetch of `url` never completes
    pub fn with_hang(mut self, url: &str) -> Self {
        self.pages.insert(key(url), MockPage::Hang);
        self
    }

    /// Probes of `url` succeed
    pub fn with_reachable(mut self, url: &str) -> Self {
        self.reachable.insert(key(url));
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        self.fetched.lock().unwrap().push(url.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.get(url.as_str()).cloned();
        let result = match page {
            Some(MockPage::Body {
                final_url,
                content_type,
                body,
            }) => FetchResult::Success(PageFetch {
                url: final_url,
                status_code: 200,
                content_type: content_type.to_string(),
                body,
            }),
            Some(MockPage::Status(status_code)) => FetchResult::HttpError { status_code },
            Some(MockPage::Hang) => std::future::pending().await,
            None => FetchResult::HttpError { status_code: 404 },
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn probe(&self, url: &Url) -> bool {
        self.probed.lock().unwrap().push(url.to_string());
        self.reachable.contains(url.as_str())
    }
}
