//! Page source seam: HTTP in production, canned HTML in tests.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Fetches raw HTML documents.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get_html(&self, url: &str) -> FetchResult<String>;
}

/// HTTP implementation carrying the header set the site expects: a
/// browser-like User-Agent plus XHR-indicating headers.
pub struct HttpPageSource {
    client: reqwest::Client,
    user_agent: String,
    referer: String,
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            referer: "https://www.daft.ie/".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom Referer header.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get_html(&self, url: &str) -> FetchResult<String> {
        debug!(url = %url, "page fetch starting");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Referer", &self.referer)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "page request failed");
                FetchError::Http(Box::new(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(Box::new(std::io::Error::other(format!(
                "HTTP {status}"
            )))));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}
