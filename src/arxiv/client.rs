//! HTTP client for the arXiv query API.

use super::{parse_feed, Paper, PaperSearch};
use crate::config::ArxivSettings;
use crate::error::{ArxivQaError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// arXiv API client.
pub struct ArxivClient {
    http: reqwest::Client,
    api_url: String,
}

impl ArxivClient {
    /// Create a client from settings.
    pub fn new(settings: &ArxivSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("arxiv-qa/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
        })
    }

    fn search_url(&self, query: &str, max_results: u32) -> Result<Url> {
        let max_results = max_results.to_string();
        Url::parse_with_params(
            &self.api_url,
            &[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ],
        )
        .map_err(|e| ArxivQaError::Config(format!("Invalid arXiv API URL: {}", e)))
    }

    fn fetch_url(&self, ids: &[String]) -> Result<Url> {
        Url::parse_with_params(
            &self.api_url,
            &[
                ("id_list", ids.join(",")),
                ("max_results", ids.len().to_string()),
            ],
        )
        .map_err(|e| ArxivQaError::Config(format!("Invalid arXiv API URL: {}", e)))
    }

    async fn get_feed(&self, url: Url) -> Result<Vec<Paper>> {
        debug!("GET {}", url);

        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_feed(&body)
    }
}

#[async_trait]
impl PaperSearch for ArxivClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Paper>> {
        if query.trim().is_empty() {
            return Err(ArxivQaError::InvalidInput("Empty arXiv search query".to_string()));
        }

        let url = self.search_url(query, max_results)?;
        let papers = self.get_feed(url).await?;
        debug!("arXiv search returned {} papers", papers.len());
        Ok(papers)
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Paper>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.fetch_url(ids)?;
        self.get_feed(url).await
    }
}
