use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{BlogwatchError, Result};
use crate::domain::{Blog, StoredPost, Subscriber, Subscription};
use crate::store::Registry;

const BLOG_COLUMNS: &str =
    "id, url, name, category, is_active, accept_invalid_certs, last_checked, created_at";

const POST_COLUMNS: &str =
    "p.id, p.subscription_id, p.title, p.link, p.summary, p.content, p.published_at, p.detected_at, p.is_new";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| BlogwatchError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            BlogwatchError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn blog_from_row(row: &Row<'_>) -> rusqlite::Result<Blog> {
        Ok(Blog {
            id: row.get(0)?,
            url: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            accept_invalid_certs: row.get::<_, i32>(5)? != 0,
            last_checked: row
                .get::<_, Option<String>>(6)?
                .and_then(|s| Self::parse_datetime(&s)),
            created_at: row
                .get::<_, String>(7)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    fn post_from_row(row: &Row<'_>) -> rusqlite::Result<StoredPost> {
        Ok(StoredPost {
            id: row.get(0)?,
            subscription_id: row.get(1)?,
            title: row.get(2)?,
            link: row.get(3)?,
            summary: row.get(4)?,
            content: row.get(5)?,
            published_at: row
                .get::<_, Option<String>>(6)?
                .and_then(|s| Self::parse_datetime(&s)),
            detected_at: row
                .get::<_, String>(7)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            is_new: row.get::<_, i32>(8)? != 0,
        })
    }
}

impl Registry for SqliteStore {
    fn add_blog(&self, blog: &Blog) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO blogs (url, name, category, is_active, accept_invalid_certs, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                blog.url,
                blog.name,
                blog.category,
                blog.is_active as i32,
                blog.accept_invalid_certs as i32,
                blog.created_at.to_rfc3339(),
                now
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_blog_by_url(&self, url: &str) -> Result<Option<Blog>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE url = ?1"),
                params![url],
                Self::blog_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_blogs(&self) -> Result<Vec<Blog>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY name, url"))?;
        let blogs = stmt
            .query_map([], Self::blog_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(blogs)
    }

    fn get_active_blogs(&self) -> Result<Vec<Blog>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE is_active = 1 ORDER BY id"
        ))?;
        let blogs = stmt
            .query_map([], Self::blog_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(blogs)
    }

    fn set_blog_active(&self, id: i64, is_active: bool) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE blogs SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active as i32, Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    fn delete_blog(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM subscriptions WHERE blog_url = (SELECT url FROM blogs WHERE id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM blogs WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(())
    }

    fn touch_blogs(&self, urls: &[String], at: DateTime<Utc>) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let conn = self.conn()?;
        let at = at.to_rfc3339();
        let placeholders = (0..urls.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE blogs SET last_checked = ?1, updated_at = ?1 WHERE url IN ({placeholders})"
        );
        let values = std::iter::once(at.as_str()).chain(urls.iter().map(String::as_str));
        conn.execute(&sql, params_from_iter(values))?;

        Ok(())
    }

    fn add_subscriber(&self, email: &str) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO subscribers (email, created_at) VALUES (?1, ?2)",
            params![email, Utc::now().to_rfc3339()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, email, created_at FROM subscribers WHERE email = ?1",
                params![email],
                |row| {
                    Ok(Subscriber {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: row
                            .get::<_, String>(2)
                            .ok()
                            .and_then(|s| Self::parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn subscribe(&self, subscriber_id: i64, blog: &Blog) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO subscriptions (subscriber_id, blog_url, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(subscriber_id, blog_url) DO UPDATE SET name = ?3, updated_at = ?4",
            params![subscriber_id, blog.url, blog.name, now],
        )?;

        let id = conn.query_row(
            "SELECT id FROM subscriptions WHERE subscriber_id = ?1 AND blog_url = ?2",
            params![subscriber_id, blog.url],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn unsubscribe(&self, subscriber_id: i64, blog_url: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "DELETE FROM subscriptions WHERE subscriber_id = ?1 AND blog_url = ?2",
            params![subscriber_id, blog_url],
        )?;
        Ok(())
    }

    fn get_subscriptions_by_url(&self, blog_url: &str) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT s.id, s.subscriber_id, u.email, s.blog_url, s.name, s.last_checked
             FROM subscriptions s JOIN subscribers u ON u.id = s.subscriber_id
             WHERE s.blog_url = ?1 ORDER BY s.id",
        )?;

        let subscriptions = stmt
            .query_map(params![blog_url], |row| {
                Ok(Subscription {
                    id: row.get(0)?,
                    subscriber_id: row.get(1)?,
                    email: row.get(2)?,
                    blog_url: row.get(3)?,
                    name: row.get(4)?,
                    last_checked: row
                        .get::<_, Option<String>>(5)?
                        .and_then(|s| Self::parse_datetime(&s)),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }

    fn touch_subscription(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE subscriptions SET last_checked = ?1, updated_at = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), id],
        )?;
        Ok(())
    }

    fn add_posts(&self, posts: &[StoredPost]) -> Result<usize> {
        let mut conn = self.conn()?;

        let tx = conn.transaction()?;
        let mut count = 0;

        for post in posts {
            count += tx.execute(
                "INSERT INTO posts (subscription_id, title, link, summary, content, published_at, detected_at, is_new)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    post.subscription_id,
                    post.title,
                    post.link,
                    post.summary,
                    post.content,
                    post.published_at.map(|dt| dt.to_rfc3339()),
                    post.detected_at.to_rfc3339(),
                    post.is_new as i32
                ],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    fn get_posts_by_subscriber(&self, subscriber_id: i64) -> Result<Vec<StoredPost>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts p
             JOIN subscriptions s ON s.id = p.subscription_id
             WHERE s.subscriber_id = ?1
             ORDER BY p.detected_at DESC, p.id"
        ))?;

        let posts = stmt
            .query_map(params![subscriber_id], Self::post_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    fn mark_posts_seen(&self, subscriber_id: i64) -> Result<usize> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE posts SET is_new = 0
             WHERE is_new = 1 AND subscription_id IN
                 (SELECT id FROM subscriptions WHERE subscriber_id = ?1)",
            params![subscriber_id],
        )?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_post(subscription_id: i64, title: &str, published: Option<&str>) -> StoredPost {
        StoredPost {
            id: 0,
            subscription_id,
            title: title.into(),
            link: Some(format!("https://example.com/{title}")),
            summary: None,
            content: Some("body".into()),
            published_at: published.and_then(|s| SqliteStore::parse_datetime(s)),
            detected_at: Utc::now(),
            is_new: true,
        }
    }

    #[test]
    fn test_add_and_get_blog() {
        let store = SqliteStore::in_memory().unwrap();
        let mut blog = Blog::new("https://www.example.com/blog".into());
        blog.accept_invalid_certs = true;
        store.add_blog(&blog).unwrap();

        let retrieved = store
            .get_blog_by_url("https://www.example.com/blog")
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.name, "example.com");
        assert_eq!(retrieved.category, "General");
        assert!(retrieved.is_active);
        assert!(retrieved.accept_invalid_certs);
        assert!(retrieved.last_checked.is_none());
    }

    #[test]
    fn test_duplicate_blog_url_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let blog = Blog::new("https://example.com".into());
        store.add_blog(&blog).unwrap();
        assert!(store.add_blog(&blog).is_err());
    }

    #[test]
    fn test_active_blogs_excludes_paused() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.add_blog(&Blog::new("https://a.com".into())).unwrap();
        store.add_blog(&Blog::new("https://b.com".into())).unwrap();

        store.set_blog_active(a, false).unwrap();

        let active = store.get_active_blogs().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].url, "https://b.com");
        assert_eq!(store.get_all_blogs().unwrap().len(), 2);
    }

    #[test]
    fn test_touch_blogs_sets_last_checked() {
        let store = SqliteStore::in_memory().unwrap();
        store.add_blog(&Blog::new("https://a.com".into())).unwrap();
        store.add_blog(&Blog::new("https://b.com".into())).unwrap();

        let at = Utc::now();
        store.touch_blogs(&["https://a.com".to_string()], at).unwrap();

        let a = store.get_blog_by_url("https://a.com").unwrap().unwrap();
        let b = store.get_blog_by_url("https://b.com").unwrap().unwrap();
        assert_eq!(a.last_checked.map(|d| d.timestamp()), Some(at.timestamp()));
        assert!(b.last_checked.is_none());
    }

    #[test]
    fn test_subscriptions_by_url() {
        let store = SqliteStore::in_memory().unwrap();
        let blog = Blog::new("https://example.com".into());
        store.add_blog(&blog).unwrap();

        let alice = store.add_subscriber("alice@example.com").unwrap();
        let bob = store.add_subscriber("bob@example.com").unwrap();
        let first = store.subscribe(alice, &blog).unwrap();
        store.subscribe(bob, &blog).unwrap();

        // Subscribing twice keeps a single record.
        assert_eq!(store.subscribe(alice, &blog).unwrap(), first);

        let subs = store.get_subscriptions_by_url("https://example.com").unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].email, "alice@example.com");
        assert_eq!(subs[0].name, "example.com");

        store.unsubscribe(bob, "https://example.com").unwrap();
        assert_eq!(store.get_subscriptions_by_url("https://example.com").unwrap().len(), 1);
    }

    #[test]
    fn test_posts_round_trip_and_mark_seen() {
        let store = SqliteStore::in_memory().unwrap();
        let blog = Blog::new("https://example.com".into());
        store.add_blog(&blog).unwrap();
        let alice = store.add_subscriber("alice@example.com").unwrap();
        let sub = store.subscribe(alice, &blog).unwrap();

        let inserted = store
            .add_posts(&[
                stored_post(sub, "one", Some("2024-01-01T00:00:00Z")),
                stored_post(sub, "two", None),
            ])
            .unwrap();
        assert_eq!(inserted, 2);

        let posts = store.get_posts_by_subscriber(alice).unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.is_new));
        let two = posts.iter().find(|p| p.title == "two").unwrap();
        assert!(two.published_at.is_none());

        assert_eq!(store.mark_posts_seen(alice).unwrap(), 2);
        assert!(store
            .get_posts_by_subscriber(alice)
            .unwrap()
            .iter()
            .all(|p| !p.is_new));
    }

    #[test]
    fn test_delete_blog_drops_subscriptions_and_posts() {
        let store = SqliteStore::in_memory().unwrap();
        let blog = Blog::new("https://example.com".into());
        let blog_id = store.add_blog(&blog).unwrap();
        let other = Blog::new("https://other.com".into());
        store.add_blog(&other).unwrap();

        let alice = store.add_subscriber("alice@example.com").unwrap();
        let sub = store.subscribe(alice, &blog).unwrap();
        let other_sub = store.subscribe(alice, &other).unwrap();
        store
            .add_posts(&[stored_post(sub, "gone", None), stored_post(other_sub, "kept", None)])
            .unwrap();

        store.delete_blog(blog_id).unwrap();

        assert!(store.get_blog_by_url("https://example.com").unwrap().is_none());
        assert!(store.get_subscriptions_by_url("https://example.com").unwrap().is_empty());
        assert_eq!(store.get_subscriptions_by_url("https://other.com").unwrap().len(), 1);
        let titles: Vec<_> = store
            .get_posts_by_subscriber(alice)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["kept"]);
    }

    #[test]
    fn test_touch_subscription() {
        let store = SqliteStore::in_memory().unwrap();
        let blog = Blog::new("https://example.com".into());
        store.add_blog(&blog).unwrap();
        let alice = store.add_subscriber("alice@example.com").unwrap();
        let sub = store.subscribe(alice, &blog).unwrap();

        store.touch_subscription(sub, Utc::now()).unwrap();

        let subs = store.get_subscriptions_by_url("https://example.com").unwrap();
        assert!(subs[0].last_checked.is_some());
    }
}
