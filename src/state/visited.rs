use crate::url::{normalize_url, strip_fragment};
use std::collections::HashSet;
use url::Url;

/// Normalized URLs already fetched or enqueued for one domain
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key a URL is stored under
    pub fn key(url: &Url) -> String {
        match normalize_url(url.as_str()) {
            Ok(normalized) => normalized.into(),
            Err(_) => strip_fragment(url).into(),
        }
    }

    /// Inserts the URL, returning false if it was already present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.seen.insert(Self::key(url))
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(&Self::key(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut visited = VisitedSet::new();
        let url = Url::parse("https://example.com/about").unwrap();
        assert!(visited.insert(&url));
        assert!(!visited.insert(&url));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_equivalent_urls_share_a_key() {
        let mut visited = VisitedSet::new();
        visited.insert(&Url::parse("https://Example.com/about/").unwrap());

        assert!(visited.contains(&Url::parse("https://example.com/about#team").unwrap()));
        assert!(visited.contains(&Url::parse("https://example.com/about?utm_source=x").unwrap()));
        assert!(!visited.contains(&Url::parse("https://example.com/about-us").unwrap()));
    }
}
