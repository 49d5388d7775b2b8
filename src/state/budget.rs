use std::collections::HashSet;

/// Per-domain page and contact counters
///
/// Pages fetched during the priority scan are tracked separately and do not
/// consume the page budget. Contacts are counted as distinct emails from
/// every phase.
#[derive(Debug, Clone)]
pub struct CrawlBudget {
    max_pages: u32,
    max_contacts: u32,
    priority_pages: u32,
    pages_fetched: u32,
    emails: HashSet<String>,
}

impl CrawlBudget {
    pub fn new(max_pages: u32, max_contacts: u32) -> Self {
        Self {
            max_pages,
            max_contacts,
            priority_pages: 0,
            pages_fetched: 0,
            emails: HashSet::new(),
        }
    }

    /// Records a priority-scan fetch
    pub fn record_priority_page(&mut self) {
        self.priority_pages += 1;
    }

    /// Records a budgeted fetch, successful or not
    pub fn record_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Records found emails, returning how many were new
    pub fn record_contacts<'a, I>(&mut self, emails: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        emails
            .into_iter()
            .filter(|e| !e.is_empty())
            .filter(|e| self.emails.insert(e.to_lowercase()))
            .count()
    }

    /// True once the page counter reached its cap
    pub fn pages_exhausted(&self) -> bool {
        self.pages_fetched >= self.max_pages
    }

    /// True once more distinct contacts than the threshold were found
    pub fn contacts_exhausted(&self) -> bool {
        self.emails.len() > self.max_contacts as usize
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn priority_pages(&self) -> u32 {
        self.priority_pages
    }

    /// Total fetches for the domain, priority scan included
    pub fn total_pages(&self) -> u32 {
        self.priority_pages + self.pages_fetched
    }

    pub fn contact_count(&self) -> usize {
        self.emails.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_budget() {
        let mut budget = CrawlBudget::new(2, 20);
        budget.record_priority_page();
        budget.record_priority_page();
        assert!(!budget.pages_exhausted());

        budget.record_page();
        assert!(!budget.pages_exhausted());
        budget.record_page();
        assert!(budget.pages_exhausted());
        assert_eq!(budget.total_pages(), 4);
    }

    #[test]
    fn test_contact_threshold_is_exceeded_not_reached() {
        let mut budget = CrawlBudget::new(50, 2);
        assert_eq!(budget.record_contacts(["a@x.com", "b@x.com"]), 2);
        assert!(!budget.contacts_exhausted());

        assert_eq!(budget.record_contacts(["c@x.com"]), 1);
        assert!(budget.contacts_exhausted());
    }

    #[test]
    fn test_contacts_are_distinct_and_case_insensitive() {
        let mut budget = CrawlBudget::new(50, 20);
        assert_eq!(budget.record_contacts(["A@x.com", "a@x.com", "", "b@x.com"]), 2);
        assert_eq!(budget.contact_count(), 2);
    }
}
