pub mod snapshot;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{Blog, Post, StoredPost, Subscriber, Subscription};

pub use snapshot::FileSnapshotStore;
pub use sqlite::SqliteStore;

/// Last observed post list per blog URL.
pub trait SnapshotStore {
    /// `Ok(None)` when the blog has never been saved.
    fn load(&self, blog_url: &str) -> Result<Option<Vec<Post>>>;
    fn save(&self, blog_url: &str, posts: &[Post]) -> Result<()>;
    /// Forget the blog so the next check is a cold start. Missing is fine.
    fn remove(&self, blog_url: &str) -> Result<()>;
}

/// Blogs, subscribers and the posts recorded for them.
pub trait Registry {
    // Blog operations
    fn add_blog(&self, blog: &Blog) -> Result<i64>;
    fn get_blog_by_url(&self, url: &str) -> Result<Option<Blog>>;
    fn get_all_blogs(&self) -> Result<Vec<Blog>>;
    fn get_active_blogs(&self) -> Result<Vec<Blog>>;
    fn set_blog_active(&self, id: i64, is_active: bool) -> Result<()>;
    /// Also drops every subscription (and its posts) for the blog's URL.
    fn delete_blog(&self, id: i64) -> Result<()>;
    fn touch_blogs(&self, urls: &[String], at: DateTime<Utc>) -> Result<()>;

    // Subscriber operations
    fn add_subscriber(&self, email: &str) -> Result<i64>;
    fn get_subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>>;
    fn subscribe(&self, subscriber_id: i64, blog: &Blog) -> Result<i64>;
    fn unsubscribe(&self, subscriber_id: i64, blog_url: &str) -> Result<()>;
    fn get_subscriptions_by_url(&self, blog_url: &str) -> Result<Vec<Subscription>>;
    fn touch_subscription(&self, id: i64, at: DateTime<Utc>) -> Result<()>;

    // Post operations
    fn add_posts(&self, posts: &[StoredPost]) -> Result<usize>;
    fn get_posts_by_subscriber(&self, subscriber_id: i64) -> Result<Vec<StoredPost>>;
    fn mark_posts_seen(&self, subscriber_id: i64) -> Result<usize>;
}
