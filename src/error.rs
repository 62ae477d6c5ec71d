//! Error types for arxiv-qa.

use thiserror::Error;

/// Library-level error type for arxiv-qa operations.
#[derive(Error, Debug)]
pub enum ArxivQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Feed(#[from] quick_xml::DeError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("arXiv API error: {0}")]
    Arxiv(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// Result type alias for arxiv-qa operations.
pub type Result<T> = std::result::Result<T, ArxivQaError>;
