//! Name and job-title detection
//!
//! Person detection is delegated to a [`NameEntityExtractor`]; this module
//! bounds the text it sees, filters implausible names, and fills in missing
//! titles with a keyword matcher. [`CapitalizedNameExtractor`] is a
//! regex-only extractor for setups without an NER model.

use crate::collaborators::NameEntityExtractor;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Largest text window handed to the name extractor
pub const MAX_WINDOW_CHARS: usize = 250;

/// Distance searched on either side of a name for a job title
const TITLE_RADIUS: usize = 50;

/// Title keywords, longest alternatives first
const TITLE_KEYWORDS: &[&str] = &[
    "vice president",
    "talent acquisition",
    "human resources",
    "co-founder",
    "president",
    "director",
    "manager",
    "engineer",
    "developer",
    "architect",
    "analyst",
    "specialist",
    "founder",
    "partner",
    "principal",
    "owner",
    "editor",
    "writer",
    "author",
    "journalist",
    "reporter",
    "recruiter",
    "head",
    "lead",
    "ceo",
    "cto",
    "cfo",
    "coo",
    "cio",
    "cmo",
    "cso",
    "vp",
];

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    let keywords = TITLE_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?:[A-Z][A-Za-z&-]*\s+){{0,4}}\b(?i:{})\b(?:\s+(?:of\s+|and\s+|for\s+|&\s+)?[A-Z][A-Za-z&-]*){{0,4}}",
        keywords
    ))
    .unwrap()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

static TITLED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(Project Manager|Lead Developer|Managing Director|Engineer|Manager|Director|Founder|President|CEO|CTO|CFO|COO)\s*[:,-]?\s*([A-Z][a-z]+\s[A-Z][a-z]+)\b",
    )
    .unwrap()
});

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:-[A-Z][a-z]+)?(?: [A-Z][a-z]+(?:-[A-Z][a-z]+)?){1,3}\b").unwrap()
});

/// Capitalized words that are not part of a person's name
const NOT_NAME_WORDS: &[&str] = &[
    "about", "all", "and", "at", "avenue", "blog", "by", "call", "careers", "chief", "contact",
    "copyright", "customer", "dear", "developer", "director", "east", "email", "engineer", "for",
    "founder", "from", "get", "head", "home", "in", "inc", "inquiries", "jobs", "join", "lead",
    "learn", "llc", "ltd", "manager", "media", "meet", "more", "new", "news", "north", "office",
    "officer", "of", "on", "our", "partner", "phone", "policy", "president", "press", "privacy", "read",
    "reserved", "rights", "road", "sales", "service", "services", "south", "street", "suite", "support",
    "team", "terms", "the", "to", "touch", "us", "view", "we", "welcome", "west", "with", "your",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "june", "july", "august", "september", "october", "november",
    "december",
];

/// A person found in a text window
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonMention {
    pub name: String,
    /// Job title, empty when none was found
    pub title: String,
}

impl PersonMention {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// Finds the first job title in `text`
///
/// A title is a keyword from the title list with up to four capitalized
/// tokens on either side ("Director of Global Marketing", "Senior Editor").
pub fn find_title(text: &str) -> Option<String> {
    TITLE_RE
        .find(text)
        .map(|m| m.as_str().trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '-'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Bounded person lookup over an optional name extractor
///
/// Without an extractor every lookup returns nothing, which reduces the
/// heuristics to email-only output.
#[derive(Clone, Default)]
pub struct NameFinder {
    extractor: Option<Arc<dyn NameEntityExtractor>>,
}

impl NameFinder {
    pub fn new(extractor: Option<Arc<dyn NameEntityExtractor>>) -> Self {
        Self { extractor }
    }

    pub fn disabled() -> Self {
        Self { extractor: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.extractor.is_some()
    }

    /// Persons mentioned in `text`, in order, one entry per distinct name
    ///
    /// Text longer than the window size is split on whitespace. Names must
    /// have two or three tokens and fewer than 30 characters. Mentions
    /// without a title get one from the text around the name, if any.
    pub fn persons(&self, text: &str) -> Vec<PersonMention> {
        let Some(extractor) = &self.extractor else {
            return Vec::new();
        };

        let mut found: Vec<PersonMention> = Vec::new();
        for chunk in chunk_text(text, MAX_WINDOW_CHARS) {
            for mention in extractor.extract_persons(chunk) {
                let name = mention.name.split_whitespace().collect::<Vec<_>>().join(" ");
                if !is_plausible_name(&name) || found.iter().any(|m| m.name == name) {
                    continue;
                }

                let title = match mention.title.trim() {
                    "" => title_near(text, &name).unwrap_or_default(),
                    given => given.to_string(),
                };
                found.push(PersonMention { name, title });
            }
        }
        found
    }
}

impl std::fmt::Debug for NameFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameFinder")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn is_plausible_name(name: &str) -> bool {
    let tokens = name.split_whitespace().count();
    (2..=3).contains(&tokens) && name.len() < 30
}

/// Title within `TITLE_RADIUS` characters of the first occurrence of `name`
fn title_near(text: &str, name: &str) -> Option<String> {
    let pos = text.find(name)?;
    let window = char_window(text, pos.saturating_sub(TITLE_RADIUS), pos + name.len() + TITLE_RADIUS);
    let title = find_title(window)?;
    let title = title.replace(name, "");
    let title = title.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '-');
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Slices `text` to `[start, end)`, widened to the nearest char boundaries
pub(crate) fn char_window(text: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end.min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Splits text on whitespace into chunks of at most `max_chars` characters
///
/// A single word longer than the limit becomes its own chunk.
pub(crate) fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut chars = 0;

    for word in WORD_RE.find_iter(text) {
        let word_chars = word.as_str().chars().count();
        match start {
            None => {
                start = Some(word.start());
                chars = word_chars;
            }
            Some(s) if chars + 1 + word_chars > max_chars => {
                chunks.push(&text[s..end]);
                start = Some(word.start());
                chars = word_chars;
            }
            Some(_) => chars += 1 + word_chars,
        }
        end = word.end();
    }

    if let Some(s) = start {
        chunks.push(&text[s..end]);
    }
    chunks
}

/// Regex-only person extractor
///
/// Finds `Title: First Last` patterns and runs of two to three capitalized
/// words, trimming words that commonly start or end such runs without being
/// names ("Contact Jane Doe", "Jane Doe Director").
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedNameExtractor;

impl NameEntityExtractor for CapitalizedNameExtractor {
    fn extract_persons(&self, text: &str) -> Vec<PersonMention> {
        let mut persons: Vec<PersonMention> = Vec::new();

        for caps in TITLED_NAME_RE.captures_iter(text) {
            let name = caps[2].to_string();
            if !persons.iter().any(|p| p.name == name) {
                persons.push(PersonMention::new(name, &caps[1]));
            }
        }

        for m in NAME_RE.find_iter(text) {
            let Some(name) = trim_non_name_words(m.as_str()) else {
                continue;
            };
            if is_plausible_name(&name) && !persons.iter().any(|p| p.name == name) {
                persons.push(PersonMention::new(name, ""));
            }
        }

        persons
    }
}

fn is_name_word(word: &str) -> bool {
    !NOT_NAME_WORDS.contains(&word.to_lowercase().as_str())
}

fn trim_non_name_words(run: &str) -> Option<String> {
    let mut words: Vec<&str> = run.split(' ').collect();
    while words.first().is_some_and(|w| !is_name_word(w)) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| !is_name_word(w)) {
        words.pop();
    }
    if words.len() < 2 || words.iter().any(|w| !is_name_word(w)) {
        return None;
    }
    Some(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_title() {
        assert_eq!(
            find_title("She is the Director of Global Marketing at Acme"),
            Some("Director of Global Marketing".to_string())
        );
        assert_eq!(find_title("Senior Editor, Features"), Some("Senior Editor".to_string()));
        assert_eq!(find_title("CEO"), Some("CEO".to_string()));
        assert_eq!(find_title("nothing relevant here"), None);
    }

    #[test]
    fn test_chunk_text() {
        let text = "alpha beta gamma delta";
        assert_eq!(chunk_text(text, 11), vec!["alpha beta", "gamma delta"]);
        assert_eq!(chunk_text(text, 100), vec![text]);
        assert_eq!(chunk_text("   ", 10), Vec::<&str>::new());
        assert_eq!(chunk_text("enormous tiny", 3), vec!["enormous", "tiny"]);
    }

    #[test]
    fn test_chunks_respect_window_size() {
        let text = "word ".repeat(200);
        for chunk in chunk_text(&text, MAX_WINDOW_CHARS) {
            assert!(chunk.chars().count() <= MAX_WINDOW_CHARS);
        }
    }

    #[test]
    fn test_char_window_on_multibyte_text() {
        let text = "Zoë Müller";
        let window = char_window(text, 2, 3);
        assert!(window.contains('ë'));
    }

    #[test]
    fn test_capitalized_extractor() {
        let persons = CapitalizedNameExtractor
            .extract_persons("Contact Jane Doe or John Roe. CEO: Mary Major. Info Team replies.");
        let names: Vec<&str> = persons.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mary Major", "Jane Doe", "John Roe"]);
        assert_eq!(persons[0].title, "CEO");
    }

    #[test]
    fn test_capitalized_extractor_rejects_boilerplate() {
        let persons = CapitalizedNameExtractor
            .extract_persons("Privacy Policy | Terms Of Service | All Rights Reserved");
        assert!(persons.is_empty());
    }

    #[test]
    fn test_name_finder_disabled() {
        assert!(NameFinder::disabled().persons("Jane Doe").is_empty());
    }

    #[test]
    fn test_name_finder_fills_title_from_context() {
        let finder = NameFinder::new(Some(Arc::new(CapitalizedNameExtractor)));
        let persons = finder.persons("Our press office is led by Jane Doe, Head of Communications.");
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "Jane Doe");
        assert_eq!(persons[0].title, "Head of Communications");
    }
}
