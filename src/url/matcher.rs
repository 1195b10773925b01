/// Checks if a host is the base domain or one of its subdomains
///
/// The match is label-aligned: the candidate must equal `base` or end with
/// `.` followed by `base`, so a host that merely ends with the same characters
/// does not match.
///
/// # Arguments
///
/// * `base` - The registered domain, e.g. "example.com"
/// * `candidate` - The host to check
///
/// # Examples
///
/// ```
/// use wraith::url::matches_subdomain;
///
/// assert!(matches_subdomain("example.com", "example.com"));
/// assert!(matches_subdomain("example.com", "blog.example.com"));
/// assert!(matches_subdomain("example.com", "api.v2.example.com"));
/// assert!(!matches_subdomain("example.com", "evilexample.com"));
/// assert!(!matches_subdomain("example.com", "example.org"));
/// ```
pub fn matches_subdomain(base: &str, candidate: &str) -> bool {
    if base.is_empty() {
        return false;
    }

    match candidate.strip_suffix(base) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}
