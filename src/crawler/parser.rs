//! Link and email extraction from fetched pages
//!
//! This module turns a fetched page into:
//! - The emails visible on it (plain, mailto targets and decoded protected addresses)
//! - Internal page links, with their anchor text
//! - Document links (PDF, Word, PowerPoint, Excel), on any domain

use crate::email::{decode_cfemail, deobfuscate_text, email_from_mailto, find_emails, payload_from_href, PROTECTION_MARKER};
use crate::url::{strip_fragment, Site};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extensions forwarded to the document extractor instead of being crawled
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx"];

/// An internal link and the text it was shown with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    pub anchor_text: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Distinct lower-cased emails, in first-seen order
    pub emails: Vec<String>,
    /// Same-site http(s) links, fragment stripped, deduplicated
    pub page_links: Vec<DiscoveredLink>,
    /// Document links, fragment stripped, deduplicated
    pub document_links: Vec<Url>,
}

/// Extracts emails and links relative to one site
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    site: Site,
}

impl LinkExtractor {
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    /// Extracts emails and classified links from fetched content
    ///
    /// Non-HTML content yields only the emails found in its text.
    ///
    /// # Arguments
    ///
    /// * `content` - Response body or rendered DOM
    /// * `content_type` - Content-Type of the response (may be empty)
    /// * `url` - The page's URL, used to resolve relative links
    pub fn extract(&self, content: &str, content_type: &str, url: &Url) -> ExtractedPage {
        let looks_like_html = content_type.contains("html")
            || (content_type.is_empty() && content.trim_start().starts_with('<'));

        if !looks_like_html {
            return ExtractedPage {
                emails: find_emails(&deobfuscate_text(content)),
                ..Default::default()
            };
        }

        let document = Html::parse_document(content);
        let mut emails = find_emails(&visible_text(&document));
        let mut page_links: Vec<DiscoveredLink> = Vec::new();
        let mut document_links: Vec<Url> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for element in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(email) = email_from_mailto(href) {
                if !emails.contains(&email) {
                    emails.push(email);
                }
                continue;
            }

            let Some(link) = resolve_link(href, url) else {
                continue;
            };

            if !seen.insert(link.to_string()) {
                continue;
            }

            if is_document_link(&link) {
                document_links.push(link);
            } else if self.site.contains(&link) {
                page_links.push(DiscoveredLink {
                    url: link,
                    anchor_text: collapse_whitespace(&element.text().collect::<String>()),
                });
            }
        }

        ExtractedPage {
            emails,
            page_links,
            document_links,
        }
    }
}

/// Returns the readable text of a whole document
///
/// See [`element_text`].
pub fn visible_text(document: &Html) -> String {
    element_text(document.root_element())
}

/// Returns the readable text below an element
///
/// Text nodes are trimmed and joined with single spaces. Script, style and
/// template content is skipped. Protected addresses are replaced by their
/// decoded form, and spelled-out obfuscations are rewritten as plain emails.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_text(element, &mut parts);
    deobfuscate_text(&parts.join(" "))
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
            continue;
        }

        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };
        let value = child_element.value();

        if HIDDEN_ELEMENTS.contains(&value.name()) {
            continue;
        }

        if let Some(email) = protected_email(child_element) {
            parts.push(email);
            continue;
        }

        collect_text(child_element, parts);
    }
}

/// Decodes an element carrying a protected address, if it is one
fn protected_email(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();

    let payload = match value.attr("data-cfemail") {
        Some(payload) => payload,
        None if value.name() == "a" => payload_from_href(value.attr("href")?)?,
        None => return None,
    };

    match decode_cfemail(payload) {
        Ok(email) => Some(email),
        Err(e) => {
            tracing::debug!("Dropping protected email: {}", e);
            None
        }
    }
}

/// Resolves a link href to an absolute, fragment-free http(s) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - email-protection links (handled as text)
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.contains(PROTECTION_MARKER) {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    Some(strip_fragment(&absolute))
}

/// True when the URL path ends in a document extension
pub fn is_document_link(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    match path.rsplit_once('.') {
        Some((_, ext)) => DOCUMENT_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
