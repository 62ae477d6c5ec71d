//! Prompt templates for arxiv-qa.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub query: QueryPrompts,
}

/// Prompts used for answering a query with the arXiv agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPrompts {
    /// System prompt for the agent.
    pub system: String,
    /// Template wrapped around the user's query. `{{query}}` is substituted.
    pub augmentation: String,
}

impl Default for QueryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a research assistant with access to the arXiv paper archive.

You have tools to search arXiv and to read the details of specific papers.
Think about what papers are relevant to the question, then use the tools.

Guidelines:
- Use 'search_arxiv_and_return_articles' to find papers on a topic
- Use 'read_arxiv_papers' to get full details for known arXiv IDs
- Only cite papers returned by the tools; never invent arXiv IDs
- Cite papers inline by title or arXiv ID

When you have gathered enough information, provide your final answer."#
                .to_string(),

            augmentation: r#"{{query}}

Please provide your answer with appropriate arXiv references embedded in the text. At the end, include a 'References' section listing the corresponding arXiv links for each reference."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, overriding defaults from `query.toml` in `custom_dir`.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let query_path = custom_path.join("query.toml");
            if query_path.exists() {
                let content = std::fs::read_to_string(&query_path)?;
                prompts.query = toml::from_str(&content)?;
            }
        }

        if !prompts.query.augmentation.contains("{{query}}") {
            return Err(crate::error::ArxivQaError::Config(
                "Augmentation prompt must contain {{query}}".to_string(),
            ));
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Wrap a user query in the augmentation template.
    pub fn augment_query(&self, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        Self::render(&self.query.augmentation, &vars)
    }
}
