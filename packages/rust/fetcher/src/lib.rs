//! HTTP source for chapter documents.
//!
//! Chapters are fetched one at a time from
//! `{base_url}/{translation}/{book_id}/{chapter}.json`. There is no retry:
//! a transport error, non-2xx status or undecodable body fails that single
//! request and the caller moves on.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use bibledata_shared::{ApiConfig, BibleDataError, Result};

// ---------------------------------------------------------------------------
// ChapterFetcher
// ---------------------------------------------------------------------------

/// Fetches raw chapter documents from the remote Bible API.
pub struct ChapterFetcher {
    client: Client,
    base_url: String,
    request_delay: Duration,
}

impl ChapterFetcher {
    /// Create a fetcher from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            BibleDataError::config(format!("invalid API base URL '{}': {e}", config.base_url))
        })?;

        if parsed.cannot_be_a_base() {
            return Err(BibleDataError::config(format!(
                "API base URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout())
            .build()
            .map_err(|e| BibleDataError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_delay: config.request_delay(),
        })
    }

    /// Fixed pause the caller inserts after every request.
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// URL of one chapter document.
    pub fn chapter_url(&self, translation: &str, book_id: &str, chapter: u32) -> String {
        format!("{}/{translation}/{book_id}/{chapter}.json", self.base_url)
    }

    /// Fetch and decode one chapter document.
    #[instrument(skip(self))]
    pub async fn fetch_chapter(
        &self,
        translation: &str,
        book_id: &str,
        chapter: u32,
    ) -> Result<Value> {
        let url = self.chapter_url(translation, book_id, chapter);
        debug!(%url, "fetching chapter");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BibleDataError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BibleDataError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BibleDataError::Network(format!("{url}: body read failed: {e}")))?;

        serde_json::from_slice(&body)
            .map_err(|e| BibleDataError::parse(format!("{url}: invalid JSON: {e}")))
    }
}
