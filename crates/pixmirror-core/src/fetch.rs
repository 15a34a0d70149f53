//! HTTP retrieval with per-request timeouts and failure classification.
//!
//! One shared client carries the browser User-Agent; probes and page
//! fetches run under the short timeout, image bodies under the long one.
//! Every failure is classified into a [`FetchError`] — the orchestrator
//! decides what happens next, nothing is swallowed here.

use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{FetchError, MirrorError};

/// Performs single-resource GETs for the pipeline.
pub struct Fetcher {
    client: Client,
    page_timeout: Duration,
    image_timeout: Duration,
}

impl Fetcher {
    /// Build a fetcher from the HTTP settings.
    pub fn new(config: &HttpConfig) -> Result<Self, MirrorError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MirrorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            image_timeout: Duration::from_secs(config.image_timeout_secs),
        })
    }

    /// Fetch a page, sitemap, or listing body under the probe timeout.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.page_timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }

    /// Fetch an image body under the download timeout.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.image_timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Map a `reqwest::Error` onto the fetch failure taxonomy.
fn classify(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    let message = error.to_string();

    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        // Connection errors cover DNS failures too; the error text is the
        // only way to tell them apart.
        if message.contains("dns") {
            FetchError::Dns { url }
        } else {
            FetchError::Connect { url, message }
        }
    } else {
        FetchError::Request { url, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn test_fetcher_builds_from_defaults() {
        let fetcher = Fetcher::new(&HttpConfig::default()).unwrap();
        assert_eq!(fetcher.page_timeout, Duration::from_secs(10));
        assert_eq!(fetcher.image_timeout, Duration::from_secs(30));
    }
}
