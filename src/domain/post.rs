use serde::{Deserialize, Serialize};

pub const NO_TITLE: &str = "No Title";
pub const DEFAULT_BLOG_TITLE: &str = "Blog";

/// A single post as observed on a blog, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub link: String,
    /// Raw timestamp text from the source, never validated here.
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

impl Post {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published: String::new(),
            summary: String::new(),
            content: String::new(),
        }
    }

    /// Key used to decide whether two posts are the same post across runs.
    ///
    /// Plain concatenation of title and link, so `("ab", "c")` and `("a", "bc")`
    /// collide. Duplicates inside one snapshot are kept as they are.
    pub fn identity_key(&self) -> String {
        format!("{}{}", self.title, self.link)
    }
}

/// Everything fetched for one blog at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogSnapshot {
    pub title: String,
    pub description: String,
    pub link: String,
    pub posts: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_body_fields() {
        let mut a = Post::new("Hello", "https://example.com/hello");
        let mut b = Post::new("Hello", "https://example.com/hello");
        a.summary = "first".into();
        a.published = "Mon, 01 Jan 2024 00:00:00 GMT".into();
        b.content = "something else entirely".into();
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_identity_is_plain_concatenation() {
        let post = Post::new("Title", "/link");
        assert_eq!(post.identity_key(), "Title/link");
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let post: Post = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
        assert_eq!(post.title, "Only title");
        assert_eq!(post.link, "");
        assert_eq!(post.summary, "");
        assert_eq!(post.content, "");
    }
}
