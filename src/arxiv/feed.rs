//! Atom feed parsing for arXiv API responses.

use super::Paper;
use crate::error::{ArxivQaError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^
        (?:arxiv:)?
        (?:https?://(?:www\.|export\.)?arxiv\.org/(?:abs|pdf)/)?
        (
            \d{4}\.\d{4,5}          # new style, e.g. 1706.03762
            |
            [a-z\-]+(?:\.[a-z]{2})?/\d{7}   # old style, e.g. hep-th/9901001
        )
        (v\d+)?
        (?:\.pdf)?
        /?
        $
        ",
    )
    .expect("Invalid regex")
});

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    updated: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term")]
    term: String,
}

/// Parse an arXiv Atom feed into papers.
///
/// The API reports bad queries as a single entry titled `Error`; that is
/// surfaced as [`ArxivQaError::Arxiv`].
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let feed: Feed = quick_xml::de::from_str(xml)?;

    feed.entries
        .into_iter()
        .map(|entry| {
            if entry.id.contains("/api/errors") || entry.title.trim() == "Error" {
                return Err(ArxivQaError::Arxiv(collapse_whitespace(&entry.summary)));
            }
            Ok(entry.into_paper())
        })
        .collect()
}

impl Entry {
    fn into_paper(self) -> Paper {
        let id = self
            .id
            .rsplit_once("/abs/")
            .map(|(_, id)| id.to_string())
            .unwrap_or_else(|| self.id.clone());

        let entry_url = self
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| self.id.clone());

        let pdf_url = self
            .links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf"))
            .map(|l| l.href.clone());

        let categories: Vec<String> = self.categories.into_iter().map(|c| c.term).collect();

        Paper {
            id,
            title: collapse_whitespace(&self.title),
            summary: collapse_whitespace(&self.summary),
            authors: self.authors.into_iter().map(|a| a.name.trim().to_string()).collect(),
            primary_category: categories.first().cloned(),
            categories,
            published: self.published.as_deref().and_then(parse_timestamp),
            updated: self.updated.as_deref().and_then(parse_timestamp),
            entry_url,
            pdf_url,
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a user- or model-supplied arXiv reference to a bare identifier.
///
/// Accepts bare ids, `arXiv:` prefixed ids, and abs/pdf URLs. The version
/// suffix is preserved when present.
pub fn normalize_id(input: &str) -> Option<String> {
    let caps = ARXIV_ID.captures(input.trim())?;
    let base = caps.get(1)?.as_str();
    let version = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some(format!("{}{}", base, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dattention" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=attention</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2024-01-01T00:00:00-05:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
recurrent or convolutional neural networks.
    </summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: id_list=1234</title>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
    <updated>2024-01-01T00:00:00-05:00</updated>
    <link href="http://arxiv.org/api/errors#incorrect_id_format_for_1234" rel="alternate" type="text/html"/>
    <author>
      <name>arXiv api core</name>
    </author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entry() {
        let papers = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(papers.len(), 1);

        let paper = &papers[0];
        assert_eq!(paper.id, "1706.03762v7");
        assert_eq!(paper.title, "Attention Is All You Need");
        assert!(paper.summary.starts_with("The dominant sequence"));
        assert!(!paper.summary.contains('\n'));
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.categories, vec!["cs.CL", "cs.LG"]);
        assert_eq!(paper.primary_category.as_deref(), Some("cs.CL"));
        assert_eq!(paper.entry_url, "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(paper.pdf_url.as_deref(), Some("http://arxiv.org/pdf/1706.03762v7"));
        assert!(paper.published.is_some());
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_feed() {
        match parse_feed(ERROR_FEED) {
            Err(ArxivQaError::Arxiv(msg)) => assert_eq!(msg, "incorrect id format for 1234"),
            other => panic!("Expected arXiv error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("1706.03762").as_deref(), Some("1706.03762"));
        assert_eq!(normalize_id("arXiv:1706.03762v5").as_deref(), Some("1706.03762v5"));
        assert_eq!(
            normalize_id("https://arxiv.org/abs/2401.12345").as_deref(),
            Some("2401.12345")
        );
        assert_eq!(
            normalize_id("http://arxiv.org/pdf/1706.03762v7.pdf").as_deref(),
            Some("1706.03762v7")
        );
        assert_eq!(normalize_id("hep-th/9901001").as_deref(), Some("hep-th/9901001"));
        assert_eq!(normalize_id("not an id"), None);
    }
}
