//! ArXiv QA Bot
//!
//! Ask a research question, let a language model agent search arXiv for
//! relevant papers, and get back an answer with inline references. Every
//! answered query is kept in a per-session transcript that can be downloaded
//! as a plain-text file.
//!
//! # Architecture
//!
//! - `credential` - The user's API key, gating everything else
//! - `agent` - Agent factory and tool-calling loop against the model
//! - `arxiv` - arXiv API client used as the agent's capability
//! - `session` - Per-session transcript and query handling
//! - `page` - The page render cycle and its HTML/terminal hosts
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use arxiv_qa::agent::ArxivAgentFactory;
//! use arxiv_qa::config::{Prompts, Settings};
//! use arxiv_qa::credential::Credential;
//! use arxiv_qa::session::{QueryHandler, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let factory = ArxivAgentFactory::new(settings, Prompts::default())?;
//!     let credential = Credential::from_input("sk-...").expect("non-empty key");
//!
//!     let mut session = Session::new();
//!     let agent = session.agent_for(&credential, &factory)?;
//!     let answer = QueryHandler::default()
//!         .handle(agent.as_ref(), session.transcript_mut(), "What is attention?")
//!         .await?;
//!
//!     println!("{}", answer.unwrap_or_default());
//!     print!("{}", session.transcript().as_str());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod arxiv;
pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod openai;
pub mod page;
pub mod session;

pub use error::{ArxivQaError, Result};
