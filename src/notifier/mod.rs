//! Outbound notifications about newly detected posts.

pub mod outbox;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::Post;

pub use outbox::OutboxNotifier;

/// A plain-text message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub fn new_posts(to: &str, blog_url: &str, posts: &[Post], detected_at: DateTime<Utc>) -> Self {
        let (subject, body) = compose(blog_url, posts, detected_at);
        Self {
            to: to.to_string(),
            subject,
            body,
        }
    }
}

#[async_trait]
pub trait Notifier {
    async fn send(&self, message: &Message) -> Result<()>;
}

/// Subject and body announcing `posts` for `blog_url`.
pub fn compose(blog_url: &str, posts: &[Post], detected_at: DateTime<Utc>) -> (String, String) {
    let subject = format!("New Blog Posts: {} ({} new)", blog_url, posts.len());

    let mut body = format!("New posts detected on {}\n\n", blog_url);
    body.push_str(&format!("Number of new posts: {}\n", posts.len()));
    body.push_str(&format!(
        "Detection time: {}\n\n",
        detected_at.format("%Y-%m-%d %H:%M:%S")
    ));
    body.push_str(&format!("New Posts:\n{}\n\n", "=".repeat(50)));

    for (i, post) in posts.iter().enumerate() {
        body.push_str(&format!("{}. {}\n", i + 1, post.title));
        if !post.published.is_empty() {
            body.push_str(&format!("   Published: {}\n", post.published));
        }
        if !post.link.is_empty() {
            body.push_str(&format!("   Link: {}\n", post.link));
        }
        if !post.summary.is_empty() {
            body.push_str(&format!("   Summary: {}\n", post.summary));
        }
        body.push_str(&format!("\n{}\n\n", "-".repeat(40)));
    }

    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compose_layout() {
        let mut first = Post::new("First", "https://example.com/1");
        first.published = "2024-01-01".into();
        first.summary = "Short".into();
        let second = Post::new("Second", "");
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();

        let (subject, body) = compose("https://example.com", &[first, second], at);

        assert_eq!(subject, "New Blog Posts: https://example.com (2 new)");
        let expected = format!(
            "New posts detected on https://example.com\n\n\
             Number of new posts: 2\n\
             Detection time: 2024-02-03 04:05:06\n\n\
             New Posts:\n{eq}\n\n\
             1. First\n   Published: 2024-01-01\n   Link: https://example.com/1\n   Summary: Short\n\n{dash}\n\n\
             2. Second\n\n{dash}\n\n",
            eq = "=".repeat(50),
            dash = "-".repeat(40),
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_message_addresses_recipient() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let message = Message::new_posts("a@example.com", "https://x.com", &[Post::new("T", "")], at);
        assert_eq!(message.to, "a@example.com");
        assert!(message.subject.ends_with("(1 new)"));
    }
}
