use crate::config::RefreshConfig;
use crate::error::RefreshError;
use std::time::Duration;
use tracing::debug;

/// HTTP client for provider pricing pages
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(RefreshError::ClientBuild)?;

        Ok(Self { client })
    }

    pub fn from_config(config: &RefreshConfig) -> Result<Self, RefreshError> {
        Self::new(
            Duration::from_secs(config.timeout_seconds),
            &config.user_agent,
        )
    }

    /// Download a page as text; HTTP error statuses count as failures.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub async fn fetch_page(&self, url: &str) -> Result<String, RefreshError> {
        let fetch_err = |source| RefreshError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_err)?;

        let bytes = response.bytes().await.map_err(fetch_err)?;
        debug!(url, bytes = bytes.len(), "Fetched pricing page");

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
