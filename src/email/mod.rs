//! Email extraction
//!
//! Regex matching over visible text, filtering of asset-path false positives,
//! normalization of the common "name [at] domain [dot] com" spellings, and
//! decoding of XOR-protected addresses (see [`obfuscation`]).

pub mod obfuscation;

use once_cell::sync::Lazy;
use regex::Regex;

pub use obfuscation::{decode_cfemail, payload_from_href, PROTECTION_MARKER};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static EMAIL_EXACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static BRACKET_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[\[\(\{]\s*at\s*[\]\)\}]\s*").unwrap());

static BRACKET_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[\[\(\{]\s*dot\s*[\]\)\}]\s*").unwrap());

static SPELLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z0-9._%+-]+)\s+at\s+([a-z0-9-]+(?:\s+dot\s+[a-z0-9-]+)+)\b").unwrap()
});

static SPELLED_DOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+dot\s+").unwrap());

/// Suffixes of asset paths that look like emails (`logo@2x.png`)
const ASSET_EXTENSIONS: &[&str] = &[".png", ".jpg", ".gif", ".jpeg", ".css", ".js", ".svg", ".webp"];

/// An email match and its byte offsets in the searched text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSpan {
    pub email: String,
    pub start: usize,
    pub end: usize,
}

/// Returns true for matches that are really asset file names
pub fn is_asset_false_positive(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Finds every email occurrence in `text`, in order, with positions
///
/// Emails are lower-cased; asset false positives are dropped. Repeated
/// occurrences of the same address are all reported.
pub fn find_email_spans(text: &str) -> Vec<EmailSpan> {
    EMAIL_RE
        .find_iter(text)
        .filter(|m| !is_asset_false_positive(m.as_str()))
        .map(|m| EmailSpan {
            email: m.as_str().to_lowercase(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Finds the distinct emails in `text`, in first-seen order
pub fn find_emails(text: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for span in find_email_spans(text) {
        if !emails.contains(&span.email) {
            emails.push(span.email);
        }
    }
    emails
}

/// De-obfuscates `text` and then finds the distinct emails in it
pub fn extract_emails(text: &str) -> Vec<String> {
    find_emails(&deobfuscate_text(text))
}

/// Rewrites human-readable obfuscations into plain addresses
///
/// Handles `jane [at] example [dot] com`, `jane (at) example (dot) com` and
/// `jane at example dot com`. The spelled-out form is only rewritten when the
/// domain part contains at least one `dot`, so prose like "meet us at noon"
/// is left alone. Letter case is preserved.
pub fn deobfuscate_text(text: &str) -> String {
    let text = BRACKET_AT_RE.replace_all(text, "@");
    let text = BRACKET_DOT_RE.replace_all(&text, ".");
    SPELLED_RE
        .replace_all(&text, |caps: &regex::Captures| {
            format!("{}@{}", &caps[1], SPELLED_DOT_RE.replace_all(&caps[2], "."))
        })
        .into_owned()
}

/// Validates and lower-cases a single address
pub fn normalize_email(raw: &str) -> Option<String> {
    let candidate = raw.trim().trim_matches(|c| c == '<' || c == '>');
    if !EMAIL_EXACT_RE.is_match(candidate) || is_asset_false_positive(candidate) {
        return None;
    }
    Some(candidate.to_lowercase())
}

/// Extracts the address from a `mailto:` href
///
/// Query parts (`?subject=...`) are dropped and percent-encoding is decoded.
/// Only the first recipient of a comma-separated list is returned.
pub fn email_from_mailto(href: &str) -> Option<String> {
    let trimmed = href.trim();
    if !trimmed.get(..7)?.eq_ignore_ascii_case("mailto:") {
        return None;
    }

    let target = trimmed[7..].split('?').next().unwrap_or("");
    let decoded = urlencoding::decode(target).ok()?;
    let first = decoded.split(',').next().unwrap_or("");
    normalize_email(first)
}

/// Extracts sender addresses from the raw text of an autoresponse email
///
/// Only `From:` and `Reply-To:` header lines are considered.
pub fn emails_from_autoresponse(raw: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();

    for line in raw.lines() {
        let lower = line.trim_start().to_ascii_lowercase();
        if !(lower.starts_with("from:") || lower.starts_with("reply-to:")) {
            continue;
        }
        for email in extract_emails(line) {
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
    }

    emails
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_emails_lowercases_and_dedupes() {
        let text = "Write to Info@Example.com or info@example.com, or sales@example.com.";
        assert_eq!(
            find_emails(text),
            vec!["info@example.com".to_string(), "sales@example.com".to_string()]
        );
    }

    #[test]
    fn test_asset_paths_are_not_emails() {
        let text = "logo@2x.png hero@3x.JPG bundle@1.2.js theme@v2.css icon@2x.svg photo@2x.webp real@firm.com";
        assert_eq!(find_emails(text), vec!["real@firm.com".to_string()]);
    }

    #[test]
    fn test_spans_report_every_occurrence() {
        let text = "a@x.com then a@x.com";
        let spans = find_email_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].start, 13);
        assert_eq!(&text[spans[1].start..spans[1].end], "a@x.com");
    }

    #[test]
    fn test_deobfuscate_brackets() {
        assert_eq!(
            deobfuscate_text("jane [at] example [dot] com"),
            "jane@example.com"
        );
        assert_eq!(
            deobfuscate_text("jane(AT)example(dot)co(dot)uk"),
            "jane@example.co.uk"
        );
    }

    #[test]
    fn test_deobfuscate_spelled_out() {
        assert_eq!(
            extract_emails("Reach Jane at jane at example dot com today"),
            vec!["jane@example.com".to_string()]
        );
    }

    #[test]
    fn test_deobfuscate_leaves_prose_alone() {
        let text = "Meet us at the office at noon.";
        assert_eq!(deobfuscate_text(text), text);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" <Bob@Example.COM> "), Some("bob@example.com".to_string()));
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("sprite@2x.png"), None);
    }

    #[test]
    fn test_email_from_mailto() {
        assert_eq!(
            email_from_mailto("mailto:Info@Example.com?subject=Hello"),
            Some("info@example.com".to_string())
        );
        assert_eq!(
            email_from_mailto("MAILTO:jane%2Bpress@example.com"),
            Some("jane+press@example.com".to_string())
        );
        assert_eq!(
            email_from_mailto("mailto:a@x.com,b@x.com"),
            Some("a@x.com".to_string())
        );
        assert_eq!(email_from_mailto("mailto:"), None);
        assert_eq!(email_from_mailto("https://example.com"), None);
    }

    #[test]
    fn test_emails_from_autoresponse() {
        let raw = "Subject: Thanks for reaching out\n\
                   From: Support Team <Support@Example.com>\n\
                   Reply-To: help [at] example [dot] com\n\
                   To: me@mine.org\n\
                   \n\
                   Write to other@example.com for anything else.";
        assert_eq!(
            emails_from_autoresponse(raw),
            vec!["support@example.com".to_string(), "help@example.com".to_string()]
        );
    }
}
