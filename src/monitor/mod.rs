//! Per-blog fetch and change detection.
//!
//! ```text
//! base URL → feed candidates → FeedNormalizer ─┐
//!          └ (no feed) → page → HtmlNormalizer ─┴→ BlogSnapshot → detect_new_posts
//! ```

pub mod batch;

use std::sync::Arc;

use crate::app::Result;
use crate::detector::detect_new_posts;
use crate::domain::{Blog, BlogSnapshot, Post};
use crate::fetcher::feed_probe::probe_feeds;
use crate::fetcher::{FeedAttempt, Fetcher, TlsPolicy};
use crate::normalizer::{FeedNormalizer, HtmlNormalizer};
use crate::store::SnapshotStore;

pub use batch::{BatchRunner, RunSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    Feed(String),
    Html,
}

/// A successful fetch along with the feed candidates tried on the way.
#[derive(Debug, Clone)]
pub struct FetchedBlog {
    pub source: FetchSource,
    pub snapshot: BlogSnapshot,
    pub attempts: Vec<FeedAttempt>,
}

/// Feed first, page scraping second.
pub struct BlogFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    feed: FeedNormalizer,
    html: HtmlNormalizer,
}

impl BlogFetcher {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        feed: FeedNormalizer,
        html: HtmlNormalizer,
    ) -> Self {
        Self {
            fetcher,
            feed,
            html,
        }
    }

    pub async fn try_fetch(&self, base_url: &str, tls: TlsPolicy) -> Result<FetchedBlog> {
        let probe = probe_feeds(self.fetcher.as_ref(), &self.feed, base_url, tls).await;

        if let Some(feed_url) = probe.found_at().map(String::from) {
            if let Some(snapshot) = probe.snapshot {
                return Ok(FetchedBlog {
                    source: FetchSource::Feed(feed_url),
                    snapshot,
                    attempts: probe.attempts,
                });
            }
        }

        tracing::debug!(url = %base_url, "No feed found, scraping page");
        let html = self.fetcher.fetch_text(base_url, tls).await?;
        let snapshot = self.html.normalize(&html, base_url);

        Ok(FetchedBlog {
            source: FetchSource::Html,
            snapshot,
            attempts: probe.attempts,
        })
    }

    /// Like [`try_fetch`](Self::try_fetch) but a failure only means "nothing
    /// this cycle".
    pub async fn fetch(&self, base_url: &str, tls: TlsPolicy) -> Option<BlogSnapshot> {
        match self.try_fetch(base_url, tls).await {
            Ok(fetched) => Some(fetched.snapshot),
            Err(e) => {
                tracing::error!(url = %base_url, error = %e, "Error fetching blog");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing could be fetched this cycle
    Skipped,
    Unchanged,
    NewPosts(Vec<Post>),
}

impl CheckOutcome {
    pub fn new_posts(&self) -> &[Post] {
        match self {
            Self::NewPosts(posts) => posts,
            _ => &[],
        }
    }
}

/// Fetch, compare against the stored snapshot and remember what was seen.
pub struct BlogMonitor {
    fetcher: BlogFetcher,
    snapshots: Arc<dyn SnapshotStore + Send + Sync>,
    accept_invalid_certs: bool,
}

impl BlogMonitor {
    pub fn new(fetcher: BlogFetcher, snapshots: Arc<dyn SnapshotStore + Send + Sync>) -> Self {
        Self {
            fetcher,
            snapshots,
            accept_invalid_certs: false,
        }
    }

    /// Turns certificate verification off for every blog.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn fetcher(&self) -> &BlogFetcher {
        &self.fetcher
    }

    pub fn tls_policy(&self, blog: &Blog) -> TlsPolicy {
        TlsPolicy::from_opt_out(self.accept_invalid_certs || blog.accept_invalid_certs)
    }

    pub async fn check_blog(&self, blog: &Blog) -> CheckOutcome {
        let Some(snapshot) = self.fetcher.fetch(&blog.url, self.tls_policy(blog)).await else {
            return CheckOutcome::Skipped;
        };

        let previous = self.load_previous(&blog.url);
        let new_posts = detect_new_posts(&previous, &snapshot.posts);

        if new_posts.is_empty() {
            tracing::info!(url = %blog.url, "No new posts found");
            return CheckOutcome::Unchanged;
        }

        tracing::info!(url = %blog.url, count = new_posts.len(), "Found new posts");
        if let Err(e) = self.snapshots.save(&blog.url, &snapshot.posts) {
            // Posts may be reported again next cycle.
            tracing::error!(url = %blog.url, error = %e, "Error saving snapshot");
        }

        CheckOutcome::NewPosts(new_posts)
    }

    fn load_previous(&self, url: &str) -> Vec<Post> {
        match self.snapshots.load(url) {
            Ok(posts) => posts.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(%url, error = %e, "Error loading snapshot, treating as first check");
                Vec::new()
            }
        }
    }
}
