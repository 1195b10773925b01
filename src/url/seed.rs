use crate::url::domain::extract_domain;
use crate::{UrlError, UrlResult};
use url::Url;

/// A validated crawl starting point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    /// The seed as given, with a scheme; used for inside-path matching
    pub text: String,

    /// The parsed seed URL
    pub url: Url,

    /// Lowercase host of the seed
    pub host: String,
}

impl Seed {
    /// Parses an absolute http(s) seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use wraith::url::Seed;
    ///
    /// let seed = Seed::parse("http://Example.com/blog").unwrap();
    /// assert_eq!(seed.host, "example.com");
    /// assert_eq!(seed.text, "http://Example.com/blog");
    ///
    /// assert!(Seed::parse("example.com").is_err());
    /// ```
    pub fn parse(text: &str) -> UrlResult<Seed> {
        let text = text.trim();
        let url = Url::parse(text).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => UrlError::NotAbsolute(text.to_string()),
            other => UrlError::Parse(format!("{}: {}", text, other)),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::UnsupportedScheme {
                url: text.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = extract_domain(&url).ok_or_else(|| UrlError::MissingHost(text.to_string()))?;

        Ok(Seed {
            text: text.to_string(),
            url,
            host,
        })
    }

    /// Returns true if the raw input already names an http(s) scheme
    pub fn has_scheme(raw: &str) -> bool {
        let lower = raw.trim_start().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    /// The candidates to probe for an input without a scheme, in probe order
    pub fn scheme_candidates(raw: &str) -> [String; 2] {
        let raw = raw.trim();
        [format!("http://{}", raw), format!("https://{}", raw)]
    }
}
