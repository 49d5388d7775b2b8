use crate::url::domain::{is_same_site, registrable_domain};
use crate::UrlError;
use url::Url;

/// One crawl target, created from an input line
///
/// Immutable once built; the fetch mode chosen for the site lives in the
/// crawl report rather than here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// The input as given, used to label results
    pub input: String,
    /// Lowercase host of the homepage
    pub host: String,
    /// Scope for internal links (`example.com` for `www.example.com`)
    pub registrable: String,
    /// Homepage URL (scheme, host and port, path `/`)
    pub root: Url,
}

impl Site {
    /// Parses a website from an input line such as `example.com`,
    /// `https://www.example.com/` or `http://127.0.0.1:8080`
    ///
    /// A missing scheme defaults to `https://`.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Malformed("empty website".to_string()));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let mut root = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;
        if root.scheme() != "http" && root.scheme() != "https" {
            return Err(UrlError::InvalidScheme(root.scheme().to_string()));
        }

        let host = root
            .host_str()
            .map(|h| h.to_lowercase())
            .ok_or(UrlError::MissingDomain)?;

        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);

        Ok(Self {
            input: trimmed.to_string(),
            registrable: registrable_domain(&host),
            host,
            root,
        })
    }

    /// Resolves a path or relative reference against the homepage
    pub fn join(&self, path: &str) -> Result<Url, UrlError> {
        self.root
            .join(path)
            .map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Returns true when the URL belongs to this site's registrable domain
    pub fn contains(&self, url: &Url) -> bool {
        is_same_site(url, &self.registrable)
    }
}
