//! Robots.txt parser implementation
//!
//! Allow/disallow checks are delegated to the robotstxt crate; `Crawl-delay`
//! and `Sitemap:` lines are read here since the crate does not expose them.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
    /// Targets of `Sitemap:` directives, in file order
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
            sitemaps: parse_sitemap_directives(content),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when the site has no robots.txt or it could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            sitemaps: Vec::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The user agent string
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// `Sitemap:` directive targets, which apply regardless of user agent
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Gets the crawl delay (in seconds) for a specific user agent
    ///
    /// A group naming the agent takes precedence over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let agent = user_agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_lines = false;
        let mut for_wildcard: Option<f64> = None;
        let mut for_agent: Option<f64> = None;

        for line in self.content.lines() {
            let trimmed = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // consecutive User-agent lines share one group
                    if !in_agent_lines {
                        group_agents.clear();
                    }
                    group_agents.push(value.to_lowercase());
                    in_agent_lines = true;
                }
                "crawl-delay" => {
                    in_agent_lines = false;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group_agents
                        .iter()
                        .any(|ua| ua != "*" && agent.contains(ua.as_str()))
                    {
                        for_agent = Some(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        for_wildcard = Some(delay);
                    }
                }
                _ => in_agent_lines = false,
            }
        }

        for_agent.or(for_wildcard)
    }
}

fn parse_sitemap_directives(content: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();
    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("sitemap") {
            let target = value.trim();
            if !target.is_empty() && !sitemaps.iter().any(|s| s == target) {
                sitemaps.push(target.to_string());
            }
        }
    }
    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://example.com/admin", "ScoutBot"));
        assert!(robots.sitemaps().is_empty());
    }

    #[test]
    fn test_disallow_specific() {
        let content = "User-agent: *\nDisallow: /admin";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("https://example.com/contact", "ScoutBot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "ScoutBot"));
    }

    #[test]
    fn test_specific_user_agent() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("https://example.com/page", "GoodBot"));
        assert!(!robots.is_allowed("https://example.com/page", "BadBot"));
    }

    #[test]
    fn test_garbage_allows_everything() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed("https://example.com/any/path", "ScoutBot"));
    }

    #[test]
    fn test_sitemap_directives() {
        let content = "Sitemap: https://example.com/sitemap_index.xml\n\
                       User-agent: *\n\
                       Disallow: /tmp\n\
                       sitemap:https://example.com/news.xml\n\
                       Sitemap: https://example.com/sitemap_index.xml";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(
            robots.sitemaps(),
            &[
                "https://example.com/sitemap_index.xml".to_string(),
                "https://example.com/news.xml".to_string()
            ]
        );
    }

    #[test]
    fn test_crawl_delay_specific_over_wildcard() {
        let content = "User-agent: *\nCrawl-delay: 10\n\nUser-agent: ScoutBot\nCrawl-delay: 2";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("ScoutBot/1.0"), Some(2.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_group_spans_directives() {
        let content = "User-agent: BotA\nUser-agent: BotB\nDisallow: /x\nCrawl-delay: 3";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("BotB"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_crawl_delay_missing() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("ScoutBot"), None);
    }
}
