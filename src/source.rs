use crate::http_client;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Where a listing page's HTML comes from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Returns a short description for logging
    fn name(&self) -> &str;

    /// Fetches the current page HTML
    async fn fetch_html(&self) -> Result<String>;
}

/// A page saved to disk (e.g., via the browser's "Save page as").
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: &str) -> Self {
        Self { path: path.to_string() }
    }
}

#[async_trait]
impl PageSource for FileSource {
    fn name(&self) -> &str {
        &self.path
    }

    async fn fetch_html(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path))
    }
}

/// A live listing page fetched over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: http_client::create_http_client(user_agent)?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_html(&self) -> Result<String> {
        let response = self.client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?;

        let status = response.status();
        let html = response.text().await?;
        tracing::debug!("Fetched {}: {} ({} bytes)", self.url, status, html.len());

        if !status.is_success() {
            anyhow::bail!("Fetching {} returned {}", self.url, status);
        }

        if http_client::is_captcha_page(&html) {
            tracing::warn!("Response from {} looks like a bot check; extraction will likely come up empty", self.url);
        }

        Ok(html)
    }
}
