pub mod feed_probe;
pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;

pub use feed_probe::{AttemptOutcome, FeedAttempt, FeedProbe, FEED_PATHS};
pub use http_fetcher::HttpFetcher;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Whether a request may proceed without a verified certificate chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    #[default]
    Verify,
    /// Accepts any certificate. Exposes the request to interception.
    AcceptInvalid,
}

impl TlsPolicy {
    pub fn from_opt_out(accept_invalid_certs: bool) -> Self {
        if accept_invalid_certs {
            Self::AcceptInvalid
        } else {
            Self::Verify
        }
    }
}

/// HTTP settings shared by feed probing and page fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Skip certificate verification for every blog (default: false)
    pub accept_invalid_certs: bool,

    /// Feed entries kept per blog (default: 10)
    pub max_posts: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            max_posts: 10,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str, tls: TlsPolicy) -> Result<Vec<u8>>;

    /// GET `url` as text. Implementations that see response headers should
    /// decode with the declared charset.
    async fn fetch_text(&self, url: &str, tls: TlsPolicy) -> Result<String> {
        let body = self.fetch(url, tls).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::app::BlogwatchError;

    /// Canned responses keyed by URL; anything else answers 404.
    #[derive(Default)]
    pub struct StubFetcher {
        responses: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<(String, TlsPolicy)>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.as_bytes().to_vec());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }

        pub fn policies(&self) -> Vec<TlsPolicy> {
            self.requests.lock().unwrap().iter().map(|(_, p)| *p).collect()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str, tls: TlsPolicy) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push((url.to_string(), tls));
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| BlogwatchError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    pub fn rss(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| {
                format!("<item><title>{t}</title><link>https://blog.test/{t}</link><guid>{t}</guid></item>")
            })
            .collect();
        format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Stub</title>{items}</channel></rss>"#)
    }
}
