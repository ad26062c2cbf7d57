use feed_rs::model::{Entry, Feed, Link};
use feed_rs::parser;

use crate::app::{BlogwatchError, Result};
use crate::domain::{BlogSnapshot, Post, DEFAULT_BLOG_TITLE, NO_TITLE};
use crate::normalizer::date::parse_published;

pub const DEFAULT_MAX_POSTS: usize = 10;

/// Maps RSS/Atom/JSON feeds onto [`BlogSnapshot`].
#[derive(Debug, Clone)]
pub struct FeedNormalizer {
    max_posts: usize,
}

impl Default for FeedNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POSTS)
    }
}

impl FeedNormalizer {
    pub fn new(max_posts: usize) -> Self {
        Self { max_posts }
    }

    /// Dates are read with [`parse_published`], which also accepts
    /// human-written forms such as "January 5th, 2024".
    pub fn parse(&self, body: &[u8]) -> Result<Feed> {
        parser::Builder::new()
            .timestamp_parser(parse_published)
            .build()
            .parse(body)
            .map_err(|e| BlogwatchError::FeedParse(e.to_string()))
    }

    /// Keeps the first `max_posts` entries in feed order. Missing fields
    /// fall back to defaults instead of failing.
    pub fn normalize(&self, feed: Feed) -> BlogSnapshot {
        let posts = feed
            .entries
            .into_iter()
            .take(self.max_posts)
            .map(normalize_entry)
            .collect();

        BlogSnapshot {
            title: feed
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| DEFAULT_BLOG_TITLE.to_string()),
            description: feed.description.map(|d| d.content).unwrap_or_default(),
            link: primary_link(&feed.links).unwrap_or_default(),
            posts,
        }
    }
}

fn normalize_entry(entry: Entry) -> Post {
    Post {
        title: entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| NO_TITLE.to_string()),
        link: primary_link(&entry.links).unwrap_or_default(),
        published: entry.published.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
        summary: entry.summary.map(|s| s.content).unwrap_or_default(),
        content: entry.content.and_then(|c| c.body).unwrap_or_default(),
    }
}

/// The alternate (or unlabelled) link, else whatever comes first.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
