//! Agent system for answering research queries with tool calling.
//!
//! An agent pairs a hosted language model with a set of capabilities (here,
//! arXiv search). The [`AgentFactory`] turns a session credential into a
//! ready-to-use [`QueryAgent`].

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, tool_definitions, Capability, ToolCall, ToolContext};

use crate::arxiv::{ArxivClient, PaperSearch};
use crate::config::{Prompts, Settings};
use crate::credential::Credential;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Immutable configuration of one agent instance.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub credential: Credential,
    pub capabilities: Vec<Capability>,
    pub api_base: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl AgentConfig {
    /// Build the configuration for an arXiv agent from settings.
    pub fn arxiv(credential: Credential, settings: &Settings) -> Self {
        Self {
            model: settings.model.id.clone(),
            max_tokens: settings.model.max_tokens,
            temperature: settings.model.temperature,
            credential,
            capabilities: vec![Capability::Arxiv],
            api_base: settings.model.api_base.clone(),
            request_timeout: settings.model.request_timeout(),
        }
    }
}

/// Something that can answer a prompt.
#[async_trait]
pub trait QueryAgent: Send + Sync {
    /// Run the prompt to completion (non-streaming).
    async fn run(&self, prompt: &str) -> Result<AgentResponse>;
}

/// Builds agents from credentials.
pub trait AgentFactory: Send + Sync {
    fn create(&self, credential: &Credential) -> Result<Arc<dyn QueryAgent>>;
}

/// Factory producing arXiv-enabled agents.
///
/// The credential is not validated here; a bad key surfaces on the first
/// request.
pub struct ArxivAgentFactory {
    settings: Settings,
    prompts: Prompts,
    search: Arc<dyn PaperSearch>,
}

impl ArxivAgentFactory {
    /// Create a factory backed by the live arXiv API.
    pub fn new(settings: Settings, prompts: Prompts) -> Result<Self> {
        let search = Arc::new(ArxivClient::new(&settings.arxiv)?);
        Ok(Self::with_search(settings, prompts, search))
    }

    /// Create a factory with a custom paper search backend.
    pub fn with_search(settings: Settings, prompts: Prompts, search: Arc<dyn PaperSearch>) -> Self {
        Self {
            settings,
            prompts,
            search,
        }
    }
}

impl AgentFactory for ArxivAgentFactory {
    fn create(&self, credential: &Credential) -> Result<Arc<dyn QueryAgent>> {
        let config = AgentConfig::arxiv(credential.clone(), &self.settings);
        info!(
            "Creating agent: model={} max_tokens={} temperature={}",
            config.model, config.max_tokens, config.temperature
        );

        let tools = ToolContext::new(
            self.search.clone(),
            self.settings.arxiv.max_results,
            self.settings.arxiv.max_results_limit,
        );

        let agent = Agent::new(config, tools)?
            .with_system_prompt(&self.prompts.query.system)
            .with_max_iterations(self.settings.agent.max_iterations);

        Ok(Arc::new(agent))
    }
}
