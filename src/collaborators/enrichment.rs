//! Third-party contact enrichment with API key rotation

use crate::collaborators::ContactEnrichmentApi;
use crate::contacts::{Confidence, ContactCandidate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Pause before retrying with the next key
const DEFAULT_ROTATION_PAUSE: Duration = Duration::from_secs(1);

/// A contact returned by an enrichment service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedContact {
    pub name: String,
    pub email: String,
    pub position: String,
}

impl EnrichedContact {
    pub fn into_candidate(self, source: &str) -> ContactCandidate {
        ContactCandidate::new(self.email, self.name.trim(), self.position, source, Confidence::Medium)
    }
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The key is invalid (HTTP 401)
    #[error("API key rejected")]
    KeyRejected,

    /// The key has no credits left (HTTP 429)
    #[error("API key rate limited")]
    RateLimited,

    #[error("Enrichment request failed: {0}")]
    Request(String),

    #[error("Malformed enrichment response: {0}")]
    Malformed(String),
}

impl EnrichmentError {
    /// Maps an HTTP status to the error it signals, if any
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::KeyRejected),
            429 => Some(Self::RateLimited),
            200..=299 => None,
            other => Some(Self::Request(format!("HTTP {}", other))),
        }
    }

    /// True when retrying with another key may succeed
    pub fn should_rotate(&self) -> bool {
        matches!(self, Self::KeyRejected | Self::RateLimited)
    }
}

/// An ordered set of API keys, advanced when the current one stops working
///
/// Rotation is shared by every domain using the ring; once the last key is
/// used up the ring stays exhausted.
#[derive(Debug)]
pub struct ApiKeyRing {
    keys: Vec<String>,
    current: AtomicUsize,
    pause: Duration,
}

impl ApiKeyRing {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.into().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        tracing::debug!("Loaded {} API key(s)", keys.len());
        Self {
            keys,
            current: AtomicUsize::new(0),
            pause: DEFAULT_ROTATION_PAUSE,
        }
    }

    /// Parses a comma-separated key list
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// The key in use, or None once every key is exhausted
    pub fn current(&self) -> Option<&str> {
        self.keys
            .get(self.current.load(Ordering::SeqCst))
            .map(String::as_str)
    }

    /// Moves past `failed`; returns false when no key is left
    ///
    /// Concurrent callers that saw the same failing key rotate only once.
    pub fn rotate_from(&self, failed: &str) -> bool {
        let index = self.current.load(Ordering::SeqCst);
        if self.keys.get(index).map(String::as_str) == Some(failed) {
            let _ = self
                .current
                .compare_exchange(index, index + 1, Ordering::SeqCst, Ordering::SeqCst);
        }

        let has_next = self.current().is_some();
        if has_next {
            tracing::info!("API key limit reached, rotating to key #{}", self.current.load(Ordering::SeqCst) + 1);
        } else {
            tracing::warn!("All API keys have been exhausted");
        }
        has_next
    }

    pub fn is_exhausted(&self) -> bool {
        self.current().is_none()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Searches `domain`, rotating keys on rejection or rate limiting
///
/// Any other failure ends the search for this domain with no results.
pub async fn search_with_rotation(
    api: &dyn ContactEnrichmentApi,
    keys: &ApiKeyRing,
    domain: &str,
) -> Vec<EnrichedContact> {
    loop {
        let Some(key) = keys.current() else {
            tracing::debug!("No API key left for {}", domain);
            return Vec::new();
        };

        match api.search(domain, key).await {
            Ok(contacts) => return contacts,
            Err(e) if e.should_rotate() => {
                tracing::warn!("Enrichment key failed for {}: {}", domain, e);
                if !keys.rotate_from(key) {
                    return Vec::new();
                }
                tokio::time::sleep(keys.pause).await;
            }
            Err(e) => {
                tracing::warn!("Enrichment failed for {}: {}", domain, e);
                return Vec::new();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Rejects every key except `good`, recording the keys it saw
    struct OneGoodKey {
        good: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContactEnrichmentApi for OneGoodKey {
        async fn search(&self, domain: &str, api_key: &str) -> Result<Vec<EnrichedContact>, EnrichmentError> {
            self.seen.lock().unwrap().push(api_key.to_string());
            if api_key != self.good {
                return Err(EnrichmentError::RateLimited);
            }
            Ok(vec![EnrichedContact {
                name: "Ann Lee".to_string(),
                email: format!("ann@{}", domain),
                position: "CEO".to_string(),
            }])
        }
    }

    fn api(good: &'static str) -> OneGoodKey {
        OneGoodKey {
            good,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_ring_parsing() {
        let ring = ApiKeyRing::from_list(" k1, ,k2 ");
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.current(), Some("k1"));
    }

    #[test]
    fn test_rotation_is_once_per_failed_key() {
        let ring = ApiKeyRing::new(["k1", "k2", "k3"]);
        assert!(ring.rotate_from("k1"));
        // a second caller reporting the same stale key does not skip k2
        assert!(ring.rotate_from("k1"));
        assert_eq!(ring.current(), Some("k2"));
        assert!(ring.rotate_from("k2"));
        assert!(!ring.rotate_from("k3"));
        assert!(ring.is_exhausted());
    }

    #[test]
    fn test_status_mapping() {
        assert!(EnrichmentError::from_status(401).is_some_and(|e| e.should_rotate()));
        assert!(EnrichmentError::from_status(429).is_some_and(|e| e.should_rotate()));
        assert!(EnrichmentError::from_status(500).is_some_and(|e| !e.should_rotate()));
        assert!(EnrichmentError::from_status(200).is_none());
    }

    #[tokio::test]
    async fn test_search_rotates_to_working_key() {
        let api = api("k3");
        let ring = ApiKeyRing::new(["k1", "k2", "k3"]).with_pause(Duration::ZERO);

        let contacts = search_with_rotation(&api, &ring, "firm.com").await;
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "ann@firm.com");
        assert_eq!(*api.seen.lock().unwrap(), vec!["k1", "k2", "k3"]);

        // the working key is kept for later domains
        search_with_rotation(&api, &ring, "other.com").await;
        assert_eq!(api.seen.lock().unwrap().last().map(String::as_str), Some("k3"));
    }

    #[tokio::test]
    async fn test_search_gives_up_when_keys_run_out() {
        let api = api("none");
        let ring = ApiKeyRing::new(["k1", "k2"]).with_pause(Duration::ZERO);
        assert!(search_with_rotation(&api, &ring, "firm.com").await.is_empty());
        assert!(ring.is_exhausted());
    }

    #[test]
    fn test_enriched_contact_candidate() {
        let contact = EnrichedContact {
            name: " Ann Lee ".to_string(),
            email: "Ann@Firm.com".to_string(),
            position: "CEO".to_string(),
        };
        let candidate = contact.into_candidate("ENRICHMENT");
        assert_eq!(candidate.email, "ann@firm.com");
        assert_eq!(candidate.name, "Ann Lee");
        assert_eq!(candidate.title, "CEO");
        assert_eq!(candidate.source_url, "ENRICHMENT");
    }
}
