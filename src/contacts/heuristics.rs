//! Page-kind contact heuristics
//!
//! The kind of a page is guessed from keywords in its URL path. Each kind
//! has its own way of pairing emails with names; the general heuristic runs
//! on every page.

use crate::contacts::names::{char_window, NameFinder, PersonMention};
use crate::contacts::{Confidence, ContactCandidate};
use crate::crawler::element_text;
use crate::email::{email_from_mailto, find_email_spans, find_emails};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const PRESS_KEYWORDS: &[&str] = &["media inquiries", "press contact", "media contact", "spokesperson"];
const PRESS_WINDOW: usize = 200;

const RECRUITER_KEYWORDS: &[&str] = &["recruiter", "talent acquisition", "contact for this role"];
const RECRUITER_WINDOW: usize = 150;
const HR_LOCAL_PARTS: &[&str] = &["jobs", "careers", "recruitment"];
const HR_LABEL: &str = "HR/Recruiting";
const RECRUITER_LABEL: &str = "Recruiter";

/// Characters searched on either side of an email for a name
const NAME_RADIUS: usize = 150;

const AUTHOR_SELECTORS: &[&str] = &[
    ".author",
    ".post-author",
    ".byline",
    ".author-name",
    r#"a[rel="author"]"#,
    "span.author",
    "div.author-info",
];

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static AUTHOR_SELECTOR_LIST: Lazy<Vec<Selector>> = Lazy::new(|| {
    AUTHOR_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

/// Page kinds with a dedicated heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Press,
    Blog,
    CaseStudy,
    Jobs,
    General,
}

impl PageKind {
    /// URL path keywords selecting each kind
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Press => &["press", "news", "media"],
            Self::Blog => &["blog"],
            Self::CaseStudy => &["case-study", "testimonial", "customer-story"],
            Self::Jobs => &["careers", "jobs", "join-us"],
            Self::General => &["contact", "about", "team"],
        }
    }

    /// Kinds that apply to a URL, in evaluation order
    ///
    /// Several kinds may match; `General` is always included.
    pub fn detect(url: &Url) -> Vec<PageKind> {
        let path = url.path().to_ascii_lowercase();
        let mut kinds: Vec<PageKind> = [Self::Press, Self::Blog, Self::CaseStudy, Self::Jobs]
            .into_iter()
            .filter(|kind| kind.keywords().iter().any(|k| path.contains(k)))
            .collect();
        kinds.push(Self::General);
        kinds
    }
}

/// A parsed page shared by the heuristics
pub(crate) struct PageContext<'a> {
    pub document: &'a Html,
    /// Visible, de-obfuscated text of the page
    pub text: &'a str,
    pub source_url: &'a str,
    pub names: &'a NameFinder,
}

impl PageContext<'_> {
    fn candidate(&self, email: &str, person: Option<&PersonMention>, confidence: Confidence) -> ContactCandidate {
        match person {
            Some(p) => ContactCandidate::new(email, &p.name, &p.title, self.source_url, confidence),
            None => ContactCandidate::email_only(email, self.source_url, confidence),
        }
    }

    /// `(email, anchor text)` for every mailto link on the page
    fn mailto_links(&self) -> Vec<(String, String)> {
        self.document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| {
                let email = email_from_mailto(a.value().attr("href")?)?;
                let text = a.text().collect::<Vec<_>>().join(" ");
                Some((email, text.split_whitespace().collect::<Vec<_>>().join(" ")))
            })
            .collect()
    }
}

/// Runs the heuristic for one page kind
pub(crate) fn run(kind: PageKind, page: &PageContext<'_>) -> Vec<ContactCandidate> {
    match kind {
        PageKind::Press => press_contacts(page),
        PageKind::Blog => blog_contacts(page),
        PageKind::CaseStudy => case_study_contacts(page),
        PageKind::Jobs => jobs_contacts(page),
        PageKind::General => general_contacts(page),
    }
}

/// Text following every occurrence of each keyword, up to `window` characters
fn keyword_windows<'t>(text: &'t str, keywords: &[&str], window: usize) -> Vec<&'t str> {
    let lower = text.to_ascii_lowercase();
    let mut windows = Vec::new();
    for keyword in keywords {
        for (pos, _) in lower.match_indices(keyword) {
            windows.push(char_window(text, pos, pos + keyword.len() + window));
        }
    }
    windows
}

/// Press pages: every email and name near a media-contact keyword, paired
fn press_contacts(page: &PageContext<'_>) -> Vec<ContactCandidate> {
    let mut contacts = Vec::new();

    for window in keyword_windows(page.text, PRESS_KEYWORDS, PRESS_WINDOW) {
        let emails = find_emails(window);
        if emails.is_empty() {
            continue;
        }
        let persons = page.names.persons(window);

        for email in &emails {
            if persons.is_empty() {
                contacts.push(page.candidate(email, None, Confidence::High));
            }
            for person in &persons {
                contacts.push(page.candidate(email, Some(person), Confidence::High));
            }
        }
    }

    contacts
}

/// Blog pages: names in author/byline elements, with emails from the element or its parent
fn blog_contacts(page: &PageContext<'_>) -> Vec<ContactCandidate> {
    let mut contacts = Vec::new();

    for selector in AUTHOR_SELECTOR_LIST.iter() {
        for element in page.document.select(selector) {
            let text = element_text(element);
            let persons = page.names.persons(&text);
            if persons.is_empty() {
                continue;
            }

            let mut emails = emails_in(element, &text);
            if emails.is_empty() {
                if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
                    emails = emails_in(parent, &element_text(parent));
                }
            }

            for person in &persons {
                for email in &emails {
                    contacts.push(page.candidate(email, Some(person), Confidence::Medium));
                }
            }
        }
    }

    contacts
}

/// Emails in an element's text and in mailto links below it
fn emails_in(element: ElementRef<'_>, text: &str) -> Vec<String> {
    let mut emails = find_emails(text);
    let own = std::iter::once(element).filter(|e| e.value().name() == "a");
    for anchor in own.chain(element.select(&ANCHOR_SELECTOR)) {
        if let Some(email) = anchor.value().attr("href").and_then(email_from_mailto) {
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
    }
    emails
}

/// Case studies: every name on the page bound to the first email, low confidence
fn case_study_contacts(page: &PageContext<'_>) -> Vec<ContactCandidate> {
    let emails = find_emails(page.text);
    let Some(first) = emails.first() else {
        return Vec::new();
    };

    page.names
        .persons(page.text)
        .iter()
        .map(|person| page.candidate(first, Some(person), Confidence::Low))
        .collect()
}

/// Jobs pages: HR mailboxes, plus emails near recruiter keywords
fn jobs_contacts(page: &PageContext<'_>) -> Vec<ContactCandidate> {
    let mut contacts = Vec::new();

    for email in find_emails(page.text) {
        let local = email.split('@').next().unwrap_or("");
        if HR_LOCAL_PARTS.contains(&local) {
            contacts.push(ContactCandidate::new(
                &email,
                HR_LABEL,
                HR_LABEL,
                page.source_url,
                Confidence::High,
            ));
        }
    }

    for window in keyword_windows(page.text, RECRUITER_KEYWORDS, RECRUITER_WINDOW) {
        let emails = find_emails(window);
        if emails.is_empty() {
            continue;
        }
        let persons = page.names.persons(window);

        for email in &emails {
            if persons.is_empty() {
                contacts.push(ContactCandidate::new(
                    email,
                    RECRUITER_LABEL,
                    RECRUITER_LABEL,
                    page.source_url,
                    Confidence::High,
                ));
            }
            for person in &persons {
                let title = if person.title.is_empty() {
                    RECRUITER_LABEL
                } else {
                    person.title.as_str()
                };
                contacts.push(ContactCandidate::new(
                    email,
                    &person.name,
                    title,
                    page.source_url,
                    Confidence::High,
                ));
            }
        }
    }

    contacts
}

/// Any page: mailto links with a readable label, then every other email with
/// the nearest name around it
fn general_contacts(page: &PageContext<'_>) -> Vec<ContactCandidate> {
    let mut contacts = Vec::new();
    let mut processed: Vec<String> = Vec::new();
    let mailtos = page.mailto_links();

    for (email, label) in &mailtos {
        if processed.contains(email) || label.is_empty() || label.contains('@') {
            continue;
        }
        contacts.push(ContactCandidate::new(
            email,
            label,
            "",
            page.source_url,
            Confidence::High,
        ));
        processed.push(email.clone());
    }

    let spans = find_email_spans(page.text);
    let remaining = spans
        .iter()
        .map(|s| s.email.clone())
        .chain(mailtos.iter().map(|(email, _)| email.clone()));

    for email in remaining {
        if processed.contains(&email) {
            continue;
        }
        processed.push(email.clone());

        let person = spans
            .iter()
            .find(|s| s.email == email)
            .and_then(|span| nearest_person(page, span.start, span.end));

        let candidate = match &person {
            Some(p) => page.candidate(&email, Some(p), Confidence::Medium),
            None => page.candidate(&email, None, Confidence::Low),
        };
        contacts.push(candidate);
    }

    contacts
}

/// The person whose name sits closest to the email at `[start, end)`
fn nearest_person(page: &PageContext<'_>, start: usize, end: usize) -> Option<PersonMention> {
    let window_start = start.saturating_sub(NAME_RADIUS);
    let window = char_window(page.text, window_start, end + NAME_RADIUS);
    // char_window may widen the start to a char boundary
    let offset = window.as_ptr() as usize - page.text.as_ptr() as usize;
    let email_pos = start - offset;

    page.names
        .persons(window)
        .into_iter()
        .filter_map(|p| window.find(&p.name).map(|pos| (pos.abs_diff(email_pos), p)))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, p)| p)
}
