use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalizer::identifier::domain_name;

pub const DEFAULT_CATEGORY: &str = "General";

/// A blog monitored by the batch driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub category: String,
    pub is_active: bool,
    /// Per-blog opt-out of certificate verification.
    pub accept_invalid_certs: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    /// New active blog named after its domain.
    pub fn new(url: String) -> Self {
        let name = domain_name(&url);
        Self {
            id: 0,
            url,
            name,
            category: DEFAULT_CATEGORY.to_string(),
            is_active: true,
            accept_invalid_certs: false,
            last_checked: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A subscriber's own record of a blog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub subscriber_id: i64,
    pub email: String,
    pub blog_url: String,
    pub name: String,
    pub last_checked: Option<DateTime<Utc>>,
}

/// A detected post recorded against a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: i64,
    pub subscription_id: i64,
    pub title: String,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub detected_at: DateTime<Utc>,
    pub is_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_blog_defaults() {
        let blog = Blog::new("https://www.example.com/blog".into());
        assert_eq!(blog.name, "example.com");
        assert_eq!(blog.category, "General");
        assert!(blog.is_active);
        assert!(!blog.accept_invalid_certs);
        assert!(blog.last_checked.is_none());
    }
}
