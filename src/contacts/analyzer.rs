use crate::collaborators::NameEntityExtractor;
use crate::contacts::heuristics::{self, PageContext, PageKind};
use crate::contacts::names::NameFinder;
use crate::contacts::ContactCandidate;
use crate::crawler::visible_text;
use scraper::Html;
use std::sync::Arc;
use url::Url;

/// Runs the page-kind heuristics over fetched pages
///
/// The analyzer holds no per-page state and can be shared between crawls.
#[derive(Debug, Clone, Default)]
pub struct ContactAnalyzer {
    names: NameFinder,
}

impl ContactAnalyzer {
    /// Creates an analyzer using `extractor` for person names
    pub fn new(extractor: Option<Arc<dyn NameEntityExtractor>>) -> Self {
        Self {
            names: NameFinder::new(extractor),
        }
    }

    /// An analyzer producing email-only candidates
    pub fn without_names() -> Self {
        Self::new(None)
    }

    /// Extracts contact candidates from one page
    ///
    /// Every heuristic selected by the URL runs; candidates repeating an
    /// `(email, name, title)` already produced are dropped, keeping the first.
    pub fn analyze(&self, content: &str, url: &Url) -> Vec<ContactCandidate> {
        let document = Html::parse_document(content);
        let text = visible_text(&document);
        let source_url = url.to_string();
        let page = PageContext {
            document: &document,
            text: &text,
            source_url: &source_url,
            names: &self.names,
        };

        let mut contacts: Vec<ContactCandidate> = Vec::new();
        for kind in PageKind::detect(url) {
            for candidate in heuristics::run(kind, &page) {
                let duplicate = contacts.iter().any(|c| {
                    c.email == candidate.email && c.name == candidate.name && c.title == candidate.title
                });
                if !duplicate {
                    contacts.push(candidate);
                }
            }
        }

        tracing::debug!("{} contact candidates on {}", contacts.len(), url);
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{CapitalizedNameExtractor, Confidence};

    fn url(path: &str) -> Url {
        Url::parse("https://firm.com").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_contact_page_mailto() {
        let html = r#"<html><body><a href="mailto:info@example.com">Info Team</a></body></html>"#;
        let contacts = ContactAnalyzer::without_names().analyze(html, &url("/contact"));
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "info@example.com");
        assert_eq!(contacts[0].name, "Info Team");
        assert_eq!(contacts[0].confidence, Confidence::High);
        assert_eq!(contacts[0].source_url, "https://firm.com/contact");
    }

    #[test]
    fn test_overlapping_kinds_are_deduplicated() {
        // /news/press selects the press kind; the general kind runs as well
        let html = "<p>Media contact: press@firm.com</p>";
        let contacts = ContactAnalyzer::without_names().analyze(html, &url("/news/press"));

        // the press window claims the email first, the general scan repeats it
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "press@firm.com");
        assert_eq!(contacts[0].confidence, Confidence::High);
    }

    #[test]
    fn test_case_study_scenario() {
        let html = "<article><p>Jane Doe and John Roe share their results.</p>\
                    <p>Reach us at hello@firm.com</p></article>";
        let analyzer = ContactAnalyzer::new(Some(Arc::new(CapitalizedNameExtractor)));
        let contacts = analyzer.analyze(html, &url("/case-study/widgets"));

        let low: Vec<_> = contacts
            .iter()
            .filter(|c| c.confidence == Confidence::Low && c.has_name())
            .collect();
        assert_eq!(low.len(), 2);
        assert!(low.iter().all(|c| c.email == "hello@firm.com"));
        let names: Vec<&str> = low.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Jane Doe"));
        assert!(names.contains(&"John Roe"));
    }

    #[test]
    fn test_page_without_emails() {
        let html = "<h1>Welcome</h1><p>Nothing to see.</p>";
        assert!(ContactAnalyzer::without_names().analyze(html, &url("/about")).is_empty());
    }

    #[test]
    fn test_asset_names_are_not_contacts() {
        let html = "<p>icon@2x.png banner@3x.jpg</p>";
        assert!(ContactAnalyzer::without_names().analyze(html, &url("/")).is_empty());
    }
}
