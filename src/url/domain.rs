use std::net::IpAddr;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scout::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Reduces a hostname to the scope within which links count as internal
///
/// Uses the Public Suffix List: `www.example.com` and `blog.example.com`
/// map to `example.com`, `shop.example.co.uk` to `example.co.uk`, and
/// tenants of shared suffixes stay apart (`alice.github.io`). IP addresses,
/// single-label hosts and bare public suffixes are returned as-is.
///
/// # Arguments
///
/// * `host` - A hostname, with or without a trailing dot
///
/// # Returns
///
/// The lowercase registrable domain
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() || !host.contains('.') {
        return host;
    }

    match psl::domain_str(&host) {
        Some(domain) => domain.to_string(),
        None => host,
    }
}

/// Returns true when `url` is an http(s) URL under the given registrable domain
pub fn is_same_site(url: &Url, registrable: &str) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match extract_domain(url) {
        Some(host) => registrable_domain(&host) == registrable,
        None => false,
    }
}
