//! Configuration module for arxiv-qa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QueryPrompts};
pub use settings::{
    AgentSettings, ArxivSettings, GeneralSettings, ModelSettings, PromptSettings,
    ServerSettings, Settings,
};
