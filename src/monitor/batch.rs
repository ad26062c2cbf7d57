use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::app::Result;
use crate::domain::{Blog, Post, StoredPost};
use crate::monitor::{BlogMonitor, CheckOutcome};
use crate::normalizer::parse_published;
use crate::notifier::{Message, Notifier};
use crate::store::Registry;

pub const DEFAULT_WORKERS: usize = 4;

/// What one batch run did. Failed blogs still count as checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub checked: usize,
    pub updated: usize,
    pub skipped: usize,
    pub new_posts: usize,
    pub timestamp: DateTime<Utc>,
}

/// Checks every active blog and hands new posts to the registry and notifier.
pub struct BatchRunner {
    monitor: Arc<BlogMonitor>,
    registry: Arc<dyn Registry + Send + Sync>,
    notifier: Option<Arc<dyn Notifier + Send + Sync>>,
    workers: usize,
}

impl BatchRunner {
    pub fn new(
        monitor: Arc<BlogMonitor>,
        registry: Arc<dyn Registry + Send + Sync>,
        notifier: Option<Arc<dyn Notifier + Send + Sync>>,
    ) -> Self {
        Self {
            monitor,
            registry,
            notifier,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Fails only when the blog list itself cannot be read.
    pub async fn run(&self) -> Result<RunSummary> {
        let blogs = self.registry.get_active_blogs()?;

        if blogs.is_empty() {
            tracing::info!("No active blogs found");
            return Ok(RunSummary {
                timestamp: Utc::now(),
                ..Default::default()
            });
        }

        tracing::info!(count = blogs.len(), workers = self.workers, "Checking blogs");

        let outcomes: Vec<CheckOutcome> = stream::iter(blogs.iter())
            .map(|blog| self.process_blog(blog))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let now = Utc::now();
        let urls: Vec<String> = blogs.iter().map(|b| b.url.clone()).collect();
        if let Err(e) = self.registry.touch_blogs(&urls, now) {
            tracing::error!(error = %e, "Error updating last checked time");
        }

        let mut summary = RunSummary {
            checked: outcomes.len(),
            timestamp: now,
            ..Default::default()
        };
        for outcome in &outcomes {
            match outcome {
                CheckOutcome::Skipped => summary.skipped += 1,
                CheckOutcome::Unchanged => {}
                CheckOutcome::NewPosts(posts) => {
                    summary.updated += 1;
                    summary.new_posts += posts.len();
                }
            }
        }

        tracing::info!(
            checked = summary.checked,
            updated = summary.updated,
            skipped = summary.skipped,
            "Blog check completed"
        );
        Ok(summary)
    }

    async fn process_blog(&self, blog: &Blog) -> CheckOutcome {
        tracing::info!(url = %blog.url, "Checking blog");
        let outcome = self.monitor.check_blog(blog).await;

        if let CheckOutcome::NewPosts(posts) = &outcome {
            let detected_at = Utc::now();
            self.record_posts(blog, posts, detected_at);
            self.notify(blog, posts, detected_at).await;
        }

        outcome
    }

    /// One stored post per subscriber per new post.
    fn record_posts(&self, blog: &Blog, posts: &[Post], detected_at: DateTime<Utc>) {
        let subscriptions = match self.registry.get_subscriptions_by_url(&blog.url) {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!(url = %blog.url, error = %e, "Error loading subscriptions");
                return;
            }
        };

        if subscriptions.is_empty() {
            tracing::info!(url = %blog.url, "Nobody is subscribed");
            return;
        }

        for subscription in subscriptions {
            if let Err(e) = self.registry.touch_subscription(subscription.id, detected_at) {
                tracing::error!(subscription = subscription.id, error = %e, "Error updating subscription");
            }

            let stored: Vec<StoredPost> = posts
                .iter()
                .map(|post| to_stored(subscription.id, post, detected_at))
                .collect();

            match self.registry.add_posts(&stored) {
                Ok(count) => {
                    tracing::info!(subscriber = %subscription.email, count, "Recorded posts")
                }
                Err(e) => {
                    tracing::error!(subscriber = %subscription.email, error = %e, "Error recording posts")
                }
            }
        }
    }

    async fn notify(&self, blog: &Blog, posts: &[Post], detected_at: DateTime<Utc>) {
        let Some(notifier) = &self.notifier else {
            tracing::info!("Notifications not configured, skipping");
            return;
        };

        let subscriptions = match self.registry.get_subscriptions_by_url(&blog.url) {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!(url = %blog.url, error = %e, "Error loading subscribers");
                return;
            }
        };

        for subscription in subscriptions {
            if subscription.email.trim().is_empty() {
                continue;
            }

            let message = Message::new_posts(&subscription.email, &blog.url, posts, detected_at);
            if let Err(e) = notifier.send(&message).await {
                tracing::error!(to = %subscription.email, error = %e, "Error sending notification");
            }
        }
    }
}

fn to_stored(subscription_id: i64, post: &Post, detected_at: DateTime<Utc>) -> StoredPost {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    StoredPost {
        id: 0,
        subscription_id,
        title: post.title.clone(),
        link: non_empty(&post.link),
        summary: non_empty(&post.summary),
        content: non_empty(&post.content),
        published_at: parse_published(&post.published),
        detected_at,
        is_new: true,
    }
}
