use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tracing::debug;

use crate::error::FeedError;
use crate::model::Snapshot;

pub const DEFAULT_FEED_URL: &str = "https://api.emojitracker.com/v1/rankings";

#[async_trait]
pub trait RankingFeed: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FeedError>;
}

/// Single-attempt GET against the emojitracker rankings endpoint.
#[derive(Debug, Clone)]
pub struct HttpRankingFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpRankingFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

// The rankings API is normally called from the emojitracker web page.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.emojitracker.com/"));
    headers
}

#[async_trait]
impl RankingFeed for HttpRankingFeed {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let snapshot = Snapshot::from_json(&body)?;
        debug!(records = snapshot.len(), url = %self.url, "Fetched ranking snapshot");
        Ok(snapshot)
    }
}
