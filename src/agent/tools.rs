//! Tool definitions and implementations for the arXiv agent.

use crate::arxiv::{normalize_id, Paper, PaperSearch};
use crate::error::{ArxivQaError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capabilities an agent can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// arXiv search and paper lookup.
    Arxiv,
}

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search arXiv for a query and return the top articles.
    SearchArxivAndReturnArticles {
        query: String,
        num_articles: Option<u32>,
    },

    /// Read details for specific arXiv papers.
    ReadArxivPapers { id_list: Vec<String> },
}

/// Paper summary returned to the model.
#[derive(Debug, Serialize)]
struct ArticleSummary<'a> {
    title: &'a str,
    id: &'a str,
    entry_id: &'a str,
    authors: &'a [String],
    primary_category: Option<&'a str>,
    categories: &'a [String],
    published: Option<String>,
    pdf_url: Option<&'a str>,
    summary: &'a str,
}

impl<'a> From<&'a Paper> for ArticleSummary<'a> {
    fn from(paper: &'a Paper) -> Self {
        Self {
            title: &paper.title,
            id: &paper.id,
            entry_id: &paper.entry_url,
            authors: &paper.authors,
            primary_category: paper.primary_category.as_deref(),
            categories: &paper.categories,
            published: paper.published.map(|d| d.format("%Y-%m-%d").to_string()),
            pdf_url: paper.pdf_url.as_deref(),
            summary: &paper.summary,
        }
    }
}

/// Tool execution context with access to the paper search backend.
pub struct ToolContext {
    pub search: Arc<dyn PaperSearch>,
    pub default_results: u32,
    pub max_results: u32,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Arc<dyn PaperSearch>, default_results: u32, max_results: u32) -> Self {
        Self {
            search,
            default_results,
            max_results,
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::SearchArxivAndReturnArticles {
                query,
                num_articles,
            } => self.execute_search(query, *num_articles).await,
            ToolCall::ReadArxivPapers { id_list } => self.execute_read(id_list).await,
        }
    }

    async fn execute_search(&self, query: &str, num_articles: Option<u32>) -> Result<String> {
        let limit = num_articles
            .unwrap_or(self.default_results)
            .clamp(1, self.max_results.max(1));

        let papers = self.search.search(query, limit).await?;

        if papers.is_empty() {
            return Ok("No articles found on arXiv for this query.".to_string());
        }

        format_articles(&papers)
    }

    async fn execute_read(&self, id_list: &[String]) -> Result<String> {
        let ids = id_list
            .iter()
            .map(|raw| {
                normalize_id(raw)
                    .ok_or_else(|| ArxivQaError::InvalidInput(format!("Not an arXiv ID: {}", raw)))
            })
            .collect::<Result<Vec<_>>>()?;

        if ids.is_empty() {
            return Err(ArxivQaError::InvalidInput("No arXiv IDs given".to_string()));
        }

        let papers = self.search.fetch(&ids).await?;

        if papers.is_empty() {
            return Ok(format!("No papers found for IDs: {}", ids.join(", ")));
        }

        format_articles(&papers)
    }
}

fn format_articles(papers: &[Paper]) -> Result<String> {
    let articles: Vec<ArticleSummary<'_>> = papers.iter().map(ArticleSummary::from).collect();
    Ok(serde_json::to_string_pretty(&articles)?)
}

/// Get OpenAI function/tool definitions for the given capabilities.
pub fn tool_definitions(capabilities: &[Capability]) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    capabilities
        .iter()
        .flat_map(|capability| match capability {
            Capability::Arxiv => vec![
                ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: "search_arxiv_and_return_articles".to_string(),
                        description: Some(
                            "Search arXiv for a query and return the top articles with \
                            title, ID, authors, PDF link and abstract."
                                .to_string(),
                        ),
                        parameters: Some(serde_json::json!({
                            "type": "object",
                            "properties": {
                                "query": {
                                    "type": "string",
                                    "description": "The query to search arXiv for"
                                },
                                "num_articles": {
                                    "type": "integer",
                                    "description": "Number of articles to return (default: 5)",
                                    "default": 5
                                }
                            },
                            "required": ["query"]
                        })),
                        strict: None,
                    },
                },
                ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: "read_arxiv_papers".to_string(),
                        description: Some(
                            "Get the details of specific arXiv papers by ID. \
                            Use this when you already know which papers you need."
                                .to_string(),
                        ),
                        parameters: Some(serde_json::json!({
                            "type": "object",
                            "properties": {
                                "id_list": {
                                    "type": "array",
                                    "items": { "type": "string" },
                                    "description": "arXiv IDs, e.g. [\"1706.03762\"]"
                                }
                            },
                            "required": ["id_list"]
                        })),
                        strict: None,
                    },
                },
            ],
        })
        .collect()
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| ArxivQaError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "search_arxiv_and_return_articles" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| ArxivQaError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            let num_articles = args["num_articles"]
                .as_u64()
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
            Ok(ToolCall::SearchArxivAndReturnArticles {
                query,
                num_articles,
            })
        }
        "read_arxiv_papers" => {
            let id_list = args["id_list"]
                .as_array()
                .ok_or_else(|| ArxivQaError::Agent("Missing 'id_list' argument".to_string()))?
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            Ok(ToolCall::ReadArxivPapers { id_list })
        }
        _ => Err(ArxivQaError::Agent(format!("Unknown tool: {}", name))),
    }
}
