//! Discovered-link records
//!
//! A [`LinkRecord`] is the unit the crawler emits: one absolute URL, the
//! construct it came from, and the page it was found on.

use serde::Serialize;
use std::fmt;

/// Which construct a discovered URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// `<a href>`
    #[serde(rename = "href")]
    Href,
    /// `<script src>`
    #[serde(rename = "script")]
    Script,
    /// `<form action>`
    #[serde(rename = "form")]
    Form,
    /// URL found inside a JavaScript body
    #[serde(rename = "js")]
    Js,
    /// A crawled JavaScript file itself
    #[serde(rename = "js-file")]
    JsFile,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Href => "href",
            SourceKind::Script => "script",
            SourceKind::Form => "form",
            SourceKind::Js => "js",
            SourceKind::JsFile => "js-file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered reference
///
/// Field names serialize as `Source`, `URL` and `Where`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkRecord {
    #[serde(rename = "Source")]
    pub kind: SourceKind,

    /// Absolute URL of the reference
    #[serde(rename = "URL")]
    pub url: String,

    /// Absolute URL of the page it was found on
    #[serde(rename = "Where")]
    pub origin: String,
}

impl LinkRecord {
    pub fn new(kind: SourceKind, url: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            origin: origin.into(),
        }
    }
}
