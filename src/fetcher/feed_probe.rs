use crate::domain::BlogSnapshot;
use crate::fetcher::{Fetcher, TlsPolicy};
use crate::normalizer::FeedNormalizer;

/// Feed locations guessed for every blog, tried in this order.
pub const FEED_PATHS: [&str; 5] = ["/feed", "/rss", "/atom.xml", "/feed.xml", "/rss.xml"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Parsed with this many entries
    Entries(usize),
    /// Parsed but held no entries
    Empty,
    /// Fetch or parse failed
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FeedAttempt {
    pub url: String,
    pub outcome: AttemptOutcome,
}

/// Result of walking the feed candidates for one blog.
#[derive(Debug, Clone, Default)]
pub struct FeedProbe {
    pub attempts: Vec<FeedAttempt>,
    pub snapshot: Option<BlogSnapshot>,
}

impl FeedProbe {
    /// URL of the feed that produced the snapshot.
    pub fn found_at(&self) -> Option<&str> {
        self.snapshot.as_ref()?;
        self.attempts.last().map(|a| a.url.as_str())
    }
}

pub fn candidate_urls(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    FEED_PATHS.iter().map(|path| format!("{base}{path}")).collect()
}

/// Tries each candidate in order and stops at the first feed with entries.
/// Failed candidates are recorded and skipped.
pub async fn probe_feeds(
    fetcher: &(dyn Fetcher + Send + Sync),
    normalizer: &FeedNormalizer,
    base_url: &str,
    tls: TlsPolicy,
) -> FeedProbe {
    let mut probe = FeedProbe::default();

    for url in candidate_urls(base_url) {
        let parsed = match fetcher.fetch(&url, tls).await {
            Ok(body) => normalizer.parse(&body),
            Err(e) => Err(e),
        };

        let outcome = match parsed {
            Ok(feed) if feed.entries.is_empty() => AttemptOutcome::Empty,
            Ok(feed) => {
                let count = feed.entries.len();
                probe.snapshot = Some(normalizer.normalize(feed));
                AttemptOutcome::Entries(count)
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "Feed candidate failed");
                AttemptOutcome::Failed(e.to_string())
            }
        };

        probe.attempts.push(FeedAttempt { url, outcome });
        if probe.snapshot.is_some() {
            break;
        }
    }

    probe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::{rss, StubFetcher};

    const BASE: &str = "https://blog.test";

    #[test]
    fn test_candidate_order() {
        assert_eq!(
            candidate_urls("https://blog.test/"),
            vec![
                "https://blog.test/feed",
                "https://blog.test/rss",
                "https://blog.test/atom.xml",
                "https://blog.test/feed.xml",
                "https://blog.test/rss.xml",
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_feed_with_entries() {
        let fetcher = StubFetcher::new()
            .with("https://blog.test/rss", &rss(&[]))
            .with("https://blog.test/atom.xml", &rss(&["one", "two"]))
            .with("https://blog.test/rss.xml", &rss(&["other"]));

        let probe = probe_feeds(&fetcher, &FeedNormalizer::default(), BASE, TlsPolicy::Verify).await;

        let outcomes: Vec<_> = probe.attempts.iter().map(|a| a.outcome.clone()).collect();
        assert!(matches!(outcomes[0], AttemptOutcome::Failed(_)));
        assert_eq!(outcomes[1], AttemptOutcome::Empty);
        assert_eq!(outcomes[2], AttemptOutcome::Entries(2));
        assert_eq!(outcomes.len(), 3);
        assert_eq!(probe.found_at(), Some("https://blog.test/atom.xml"));
        assert_eq!(probe.snapshot.unwrap().posts.len(), 2);
        assert!(!fetcher.requested().contains(&"https://blog.test/feed.xml".to_string()));
    }

    #[tokio::test]
    async fn test_unparseable_candidate_is_skipped() {
        let fetcher = StubFetcher::new()
            .with("https://blog.test/feed", "<html><body>not a feed</body></html>")
            .with("https://blog.test/rss", &rss(&["ok"]));

        let probe = probe_feeds(&fetcher, &FeedNormalizer::default(), BASE, TlsPolicy::Verify).await;

        assert!(matches!(probe.attempts[0].outcome, AttemptOutcome::Failed(_)));
        assert_eq!(probe.found_at(), Some("https://blog.test/rss"));
    }

    #[tokio::test]
    async fn test_no_feed_anywhere() {
        let fetcher = StubFetcher::new();

        let probe = probe_feeds(&fetcher, &FeedNormalizer::default(), BASE, TlsPolicy::Verify).await;

        assert_eq!(probe.attempts.len(), 5);
        assert!(probe.snapshot.is_none());
        assert!(probe.found_at().is_none());
    }
}
