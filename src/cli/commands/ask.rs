//! Ask command implementation.

use crate::agent::ArxivAgentFactory;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::credential::Credential;
use crate::session::{QueryHandler, Session};
use anyhow::Result;

/// Run a single query and print the answer.
pub async fn run_ask(
    query: &str,
    api_key: Option<String>,
    transcript_path: Option<String>,
    settings: Settings,
) -> Result<()> {
    let Some(credential) = api_key.as_deref().and_then(Credential::from_input) else {
        Output::warning("No API key given. Pass --api-key or set OPENAI_API_KEY.");
        return Ok(());
    };

    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let factory = ArxivAgentFactory::new(settings.clone(), prompts.clone())?;
    let handler = QueryHandler::new(prompts);

    let mut session = Session::new();
    let agent = session.agent_for(&credential, &factory)?;

    let spinner = Output::spinner("Searching arXiv...");
    let answer = handler
        .handle(agent.as_ref(), session.transcript_mut(), query)
        .await;
    spinner.finish_and_clear();

    match answer {
        Ok(Some(content)) => println!("\n{}\n", content),
        Ok(None) => {
            Output::warning("Empty query, nothing to ask.");
            return Ok(());
        }
        Err(e) => {
            Output::error(&format!("Query failed: {}", e));
            return Err(e.into());
        }
    }

    if let Some(path) = transcript_path {
        if let Some(download) = session.transcript().export() {
            std::fs::write(&path, &download.content)?;
            Output::success(&format!("Transcript written to {}", path));
        }
    }

    Ok(())
}
