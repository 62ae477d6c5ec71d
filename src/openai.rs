//! OpenAI client construction for a session credential.

use crate::credential::Credential;
use crate::error::{ArxivQaError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client bound to the given credential.
///
/// A `timeout` of `None` leaves requests unbounded.
pub fn create_client(
    credential: &Credential,
    api_base: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Client<OpenAIConfig>> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let http_client = builder
        .build()
        .map_err(|e| ArxivQaError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(credential.expose());
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
