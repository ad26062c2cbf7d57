//! # blogwatch
//!
//! Watches a list of blogs and reports posts that were not there last time.
//!
//! ## Architecture
//!
//! Each check runs the same pipeline:
//!
//! ```text
//! Fetcher → Normalizer → Detector → Store → Notifier
//! ```
//!
//! A blog is read through its feed when one of the well-known feed
//! locations answers with entries, and through its HTML page otherwise.
//! Both paths produce the same [`BlogSnapshot`](domain::BlogSnapshot).
//!
//! ## Quick Start
//!
//! ```bash
//! # Monitor a blog and subscribe to it
//! blogwatch add https://blog.rust-lang.org
//! blogwatch subscribe me@example.com https://blog.rust-lang.org
//!
//! # Check once, or keep checking every six hours
//! blogwatch check
//! blogwatch watch --interval 6h
//! ```

/// Application context and error types.
///
/// The [`AppContext`](app::AppContext) struct wires together the registry,
/// snapshot store, monitor and notifier.
pub mod app;

/// Command-line interface using clap.
///
/// - `add`, `remove`, `list`, `pause`, `resume` - manage monitored blogs
/// - `subscribe`, `unsubscribe`, `posts` - manage subscribers
/// - `fetch <url>` - fetch one blog and print the snapshot
/// - `check` - check every active blog once
/// - `watch` - check on a fixed interval
pub mod cli;

/// Configuration loaded from `~/.config/blogwatch/config.toml`.
pub mod config;

/// Interval-driven watch loop.
pub mod daemon;

/// New-post detection by comparing two snapshots.
pub mod detector;

/// Core domain models.
///
/// - [`Post`](domain::Post) and [`BlogSnapshot`](domain::BlogSnapshot): normalized fetch results
/// - [`Blog`](domain::Blog), [`Subscriber`](domain::Subscriber), [`StoredPost`](domain::StoredPost): registry records
pub mod domain;

/// HTTP fetching and feed discovery.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching raw bytes
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`feed_probe`](fetcher::feed_probe): tries the well-known feed locations in order
pub mod fetcher;

/// Per-blog fetch with HTML fallback, and the batch runner.
pub mod monitor;

/// Feed and HTML normalization into [`Post`](domain::Post) lists.
pub mod normalizer;

/// Outgoing messages about new posts.
pub mod notifier;

/// Persistence.
///
/// - [`SqliteStore`](store::SqliteStore): blogs, subscribers and recorded posts
/// - [`FileSnapshotStore`](store::FileSnapshotStore): last-seen posts per blog
pub mod store;
