//! arXiv paper search capability.
//!
//! Wraps the public arXiv query API and exposes it behind the [`PaperSearch`]
//! trait so the agent's tools can be exercised without network access.

mod client;
mod feed;

pub use client::ArxivClient;
pub use feed::{normalize_id, parse_feed};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A paper returned by the arXiv API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    /// arXiv identifier including version, e.g. `1706.03762v7`.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub primary_category: Option<String>,
    pub categories: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// Abstract page URL.
    pub entry_url: String,
    pub pdf_url: Option<String>,
}

/// Trait for paper search backends.
#[async_trait]
pub trait PaperSearch: Send + Sync {
    /// Search for papers matching a query, most relevant first.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Paper>>;

    /// Fetch papers by arXiv identifier.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Paper>>;
}
