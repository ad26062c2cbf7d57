use std::sync::Arc;

use crate::app::Result;
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::monitor::{BatchRunner, BlogFetcher, BlogMonitor};
use crate::normalizer::{FeedNormalizer, HtmlNormalizer};
use crate::notifier::{Notifier, OutboxNotifier};
use crate::store::{FileSnapshotStore, SnapshotStore, SqliteStore};

/// Wires the stores, fetcher and notifier together from a [`Config`].
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub snapshots: Arc<dyn SnapshotStore + Send + Sync>,
    pub monitor: Arc<BlogMonitor>,
    pub notifier: Option<Arc<dyn Notifier + Send + Sync>>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.database_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let snapshots: Arc<dyn SnapshotStore + Send + Sync> =
            Arc::new(FileSnapshotStore::new(config.snapshot_dir()?)?);

        let notifier: Option<Arc<dyn Notifier + Send + Sync>> = match &config.notify.from {
            Some(from) => Some(Arc::new(OutboxNotifier::new(config.outbox_dir()?, from.clone())?)),
            None => None,
        };

        Self::with_parts(config, store, snapshots, notifier)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<SqliteStore>,
        snapshots: Arc<dyn SnapshotStore + Send + Sync>,
        notifier: Option<Arc<dyn Notifier + Send + Sync>>,
    ) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        let monitor = Arc::new(Self::build_monitor(&config, fetcher, snapshots.clone())?);

        Ok(Self {
            config,
            store,
            snapshots,
            monitor,
            notifier,
        })
    }

    pub fn build_monitor(
        config: &Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        snapshots: Arc<dyn SnapshotStore + Send + Sync>,
    ) -> Result<BlogMonitor> {
        let blog_fetcher = BlogFetcher::new(
            fetcher,
            FeedNormalizer::new(config.fetch.max_posts),
            HtmlNormalizer::new(&config.html)?,
        );

        if config.fetch.accept_invalid_certs {
            tracing::warn!("Certificate verification is disabled for all blogs");
        }

        Ok(BlogMonitor::new(blog_fetcher, snapshots)
            .accept_invalid_certs(config.fetch.accept_invalid_certs))
    }

    pub fn batch_runner(&self) -> BatchRunner {
        BatchRunner::new(
            self.monitor.clone(),
            self.store.clone(),
            self.notifier.clone(),
        )
        .with_workers(self.config.monitor.workers)
    }
}
