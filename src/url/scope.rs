use crate::url::domain::extract_domain;
use crate::url::matcher::matches_subdomain;
use std::fmt;
use url::Url;

/// The set of hosts one crawl session may fetch from
///
/// A rule is built once per seed and never changes while its session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRule {
    /// Only these exact hosts are in scope
    Exact { hosts: Vec<String> },

    /// The base domain and every subdomain of it are in scope
    Subdomains { base: String },
}

impl ScopeRule {
    /// Builds the scope rule for a seed host
    ///
    /// Without subdomains the rule allows the seed host plus the host named by
    /// a `Host` header override, so requests addressed to another virtual host
    /// stay in scope. With subdomains the override is not needed: the pattern
    /// alone decides.
    ///
    /// # Examples
    ///
    /// ```
    /// use wraith::url::ScopeRule;
    ///
    /// let exact = ScopeRule::resolve("example.com", false, Some("internal.example.com"));
    /// assert!(exact.allows_host("internal.example.com"));
    /// assert!(!exact.allows_host("sub.example.com"));
    ///
    /// let subs = ScopeRule::resolve("example.com", true, None);
    /// assert!(subs.allows_host("a.b.example.com"));
    /// assert!(!subs.allows_host("evilexample.com"));
    /// ```
    pub fn resolve(seed_host: &str, include_subdomains: bool, host_override: Option<&str>) -> Self {
        let seed_host = seed_host.to_lowercase();

        if include_subdomains {
            return ScopeRule::Subdomains { base: seed_host };
        }

        let mut hosts = vec![seed_host];
        if let Some(extra) = host_override.map(str::to_lowercase) {
            if !extra.is_empty() && !hosts.contains(&extra) {
                hosts.push(extra);
            }
        }

        ScopeRule::Exact { hosts }
    }

    /// Returns true if a bare host name is in scope
    pub fn allows_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        match self {
            ScopeRule::Exact { hosts } => hosts.iter().any(|allowed| *allowed == host),
            ScopeRule::Subdomains { base } => matches_subdomain(base, &host),
        }
    }

    /// Returns true if the URL's host is in scope
    ///
    /// URLs without a host (`mailto:`, `data:`) are never in scope.
    pub fn allows(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| self.allows_host(&host))
    }
}

impl fmt::Display for ScopeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeRule::Exact { hosts } => write!(f, "{}", hosts.join(", ")),
            ScopeRule::Subdomains { base } => write!(f, "*.{}", base),
        }
    }
}
