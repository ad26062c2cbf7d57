use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::app::{BlogwatchError, Result};
use crate::fetcher::{FetchConfig, Fetcher, TlsPolicy};

/// reqwest-backed fetcher.
///
/// Holds a verifying client and a non-verifying one; the latter is only
/// reached when a call explicitly passes [`TlsPolicy::AcceptInvalid`].
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: Self::build_client(config, false)?,
            insecure_client: Self::build_client(config, true)?,
        })
    }

    fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> Result<Client> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(client)
    }

    fn client_for(&self, url: &str, tls: TlsPolicy) -> &Client {
        match tls {
            TlsPolicy::Verify => &self.client,
            TlsPolicy::AcceptInvalid => {
                tracing::warn!(%url, "Fetching without certificate verification");
                &self.insecure_client
            }
        }
    }

    async fn get(&self, url: &str, tls: TlsPolicy) -> Result<Response> {
        let response = self.client_for(url, tls).get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlogwatchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, tls: TlsPolicy) -> Result<Vec<u8>> {
        let response = self.get(url, tls).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Decodes using the `Content-Type` charset, falling back to UTF-8.
    async fn fetch_text(&self, url: &str, tls: TlsPolicy) -> Result<String> {
        let response = self.get(url, tls).await?;
        Ok(response.text().await?)
    }
}
