//! Link extraction for fetched pages
//!
//! This module turns one fetched page into:
//! - the ordered list of [`LinkRecord`]s to report
//! - the URLs the session should consider fetching next
//!
//! HTML pages yield `href`, `script` and `form` records. When JavaScript
//! crawling is on, `.js` bodies are scanned for bare URLs as well.

use crate::crawler::fetcher::PageFetch;
use crate::crawler::record::{LinkRecord, SourceKind};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Bare `http(s)://` URL inside script text
static JS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s'"<>]+"#).expect("valid JS URL pattern"));

/// Options controlling what is reported and what is followed
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Follow script sources and scan `.js` bodies
    pub crawl_js: bool,

    /// Only follow anchors whose absolute URL contains `seed`
    pub inside_only: bool,

    /// The seed URL text of the current session
    pub seed: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records in discovery order
    pub records: Vec<LinkRecord>,

    /// Candidates to hand back to the frontier
    pub follow: Vec<Url>,
}

/// Extracts records and follow candidates from a fetched page
///
/// # Extraction Rules
///
/// | Construct | Record | Followed |
/// |-----------|--------|----------|
/// | `<a href>` | `href` | unless inside-only and the URL lacks the seed |
/// | `<script src>` | `script` | only with JS crawling |
/// | `<form action>` | `form` | never |
/// | URL in a `.js` body on the same host | `js` | never |
/// | the `.js` page itself | `js-file` | never |
///
/// Element rules only apply to HTML responses. Relative references resolve
/// against `<base href>` when present, else the page URL. References that are
/// fragment-only or fail to resolve produce nothing.
///
/// # Example
///
/// ```
/// use url::Url;
/// use wraith::crawler::{extract, ExtractOptions, PageFetch, SourceKind};
///
/// let page = PageFetch {
///     url: Url::parse("http://example.com/").unwrap(),
///     status_code: 200,
///     content_type: "text/html".to_string(),
///     body: r#"<a href="/a">A</a><script src="/app.js"></script>"#.to_string(),
/// };
/// let extraction = extract(&page, &ExtractOptions::default());
/// assert_eq!(extraction.records.len(), 2);
/// assert_eq!(extraction.records[0].kind, SourceKind::Href);
/// assert_eq!(extraction.records[0].url, "http://example.com/a");
/// assert_eq!(extraction.follow.len(), 1);
/// ```
pub fn extract(page: &PageFetch, options: &ExtractOptions) -> Extraction {
    let mut extraction = Extraction::default();

    if page.is_html() {
        extract_elements(page, options, &mut extraction);
    }

    if options.crawl_js && page.is_javascript() {
        extract_script_urls(page, &mut extraction);
    }

    extraction
}

/// Extracts anchors, scripts and forms, in that order
fn extract_elements(page: &PageFetch, options: &ExtractOptions, extraction: &mut Extraction) {
    let document = Html::parse_document(&page.body);
    let base = document_base(&document, &page.url);
    let origin = page.url.as_str();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(url) = element.value().attr("href").and_then(|href| absolute_url(&base, href))
            else {
                continue;
            };

            let eligible = !options.inside_only || url.as_str().contains(&options.seed);
            extraction
                .records
                .push(LinkRecord::new(SourceKind::Href, url.as_str(), origin));
            if eligible {
                extraction.follow.push(url);
            }
        }
    }

    if let Ok(script_selector) = Selector::parse("script[src]") {
        for element in document.select(&script_selector) {
            let Some(url) = element.value().attr("src").and_then(|src| absolute_url(&base, src))
            else {
                continue;
            };

            extraction
                .records
                .push(LinkRecord::new(SourceKind::Script, url.as_str(), origin));
            if options.crawl_js {
                extraction.follow.push(url);
            }
        }
    }

    if let Ok(form_selector) = Selector::parse("form[action]") {
        for element in document.select(&form_selector) {
            if let Some(url) = element
                .value()
                .attr("action")
                .and_then(|action| absolute_url(&base, action))
            {
                extraction
                    .records
                    .push(LinkRecord::new(SourceKind::Form, url.as_str(), origin));
            }
        }
    }
}

/// Scans a JavaScript body for same-host URLs, then reports the file itself
fn extract_script_urls(page: &PageFetch, extraction: &mut Extraction) {
    let origin = page.url.as_str();
    let page_host = page.url.host_str();

    for found in JS_URL.find_iter(&page.body) {
        if let Some(url) = absolute_url(&page.url, found.as_str()) {
            if page_host.is_some() && url.host_str() == page_host {
                extraction
                    .records
                    .push(LinkRecord::new(SourceKind::Js, url.as_str(), origin));
            }
        }
    }

    extraction
        .records
        .push(LinkRecord::new(SourceKind::JsFile, origin, origin));
}

/// Returns the URL relative references resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a reference to an absolute URL without its fragment
///
/// Returns None for fragment-only references and unresolvable input.
fn absolute_url(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();

    if reference.starts_with('#') {
        return None;
    }

    let mut url = base.join(reference).ok()?;
    url.set_fragment(None);
    Some(url)
}
