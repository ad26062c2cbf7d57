use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::app::{BlogwatchError, Result};
use crate::domain::{BlogSnapshot, Post, DEFAULT_BLOG_TITLE, NO_TITLE};

const ELLIPSIS: &str = "...";

/// Selector cascade and extraction limits for pages without a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Elements dropped before anything is extracted
    pub remove_selectors: Vec<String>,

    /// Post block selectors, in priority order. The first one that matches wins.
    pub post_selectors: Vec<String>,

    /// Where to look for a post title inside a block
    pub title_selector: String,

    /// Characters of block text kept before truncating (default: 500)
    pub content_limit: usize,

    /// Maximum number of blocks turned into posts (default: 10)
    pub max_posts: usize,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            remove_selectors: ["script", "style", "nav", "footer", "aside"]
                .into_iter()
                .map(String::from)
                .collect(),
            post_selectors: [
                "article",
                ".post",
                ".entry",
                ".blog-post",
                "[class*=\"post\"]",
                "main article",
                ".content article",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            title_selector: "h1, h2, h3, .title, .post-title".to_string(),
            content_limit: 500,
            max_posts: 10,
        }
    }
}

/// One step of the cascade.
#[derive(Debug, Clone)]
pub struct SelectorRule {
    pub name: String,
    selector: Selector,
}

impl SelectorRule {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            selector: parse_selector(name)?,
        })
    }

    /// Matching elements in document order.
    pub fn matches<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

/// Heuristic post extraction from a blog's front page.
#[derive(Debug, Clone)]
pub struct HtmlNormalizer {
    rules: Vec<SelectorRule>,
    remove: Vec<Selector>,
    title: Selector,
    link: Selector,
    page_title: Selector,
    content_limit: usize,
    max_posts: usize,
}

impl HtmlNormalizer {
    pub fn new(config: &HtmlConfig) -> Result<Self> {
        let rules = config
            .post_selectors
            .iter()
            .map(|s| SelectorRule::new(s))
            .collect::<Result<Vec<_>>>()?;
        let remove = config
            .remove_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            remove,
            title: parse_selector(&config.title_selector)?,
            link: parse_selector("a")?,
            page_title: parse_selector("title")?,
            content_limit: config.content_limit,
            max_posts: config.max_posts,
        })
    }

    pub fn rules(&self) -> &[SelectorRule] {
        &self.rules
    }

    pub fn normalize(&self, html: &str, base_url: &str) -> BlogSnapshot {
        let mut document = Html::parse_document(html);
        self.strip_noise(&mut document);

        let posts = self
            .first_matching_rule(&document)
            .map(|(rule, elements)| {
                tracing::debug!(selector = %rule.name, count = elements.len(), "Matched post blocks");
                elements
                    .into_iter()
                    .take(self.max_posts)
                    .map(|element| self.extract_post(element, base_url))
                    .collect()
            })
            .unwrap_or_default();

        let title = document
            .select(&self.page_title)
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_else(|| DEFAULT_BLOG_TITLE.to_string());

        BlogSnapshot {
            title,
            description: String::new(),
            link: base_url.to_string(),
            posts,
        }
    }

    fn strip_noise(&self, document: &mut Html) {
        let ids: Vec<_> = self
            .remove
            .iter()
            .flat_map(|selector| document.select(selector).map(|e| e.id()))
            .collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fn first_matching_rule<'a>(
        &self,
        document: &'a Html,
    ) -> Option<(&SelectorRule, Vec<ElementRef<'a>>)> {
        self.rules.iter().find_map(|rule| {
            let elements = rule.matches(document);
            (!elements.is_empty()).then_some((rule, elements))
        })
    }

    fn extract_post(&self, element: ElementRef<'_>, base_url: &str) -> Post {
        let title = element
            .select(&self.title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let href = element
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();

        let text = element.text().collect::<String>();

        Post {
            title,
            link: resolve_link(href, base_url),
            published: String::new(),
            summary: String::new(),
            content: truncate(text.trim(), self.content_limit),
        }
    }
}

/// Joins a relative link onto the base URL with exactly one `/`.
pub fn resolve_link(href: &str, base_url: &str) -> String {
    if href.is_empty() || href.starts_with("http") {
        return href.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

/// Keeps `limit` characters and appends an ellipsis when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BlogwatchError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
