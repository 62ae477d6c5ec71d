//! Terminal host: the page as an interactive prompt loop.

use crate::agent::ArxivAgentFactory;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::page::{render_page, PageContext, RenderOutcome, TerminalPage};
use crate::session::{QueryHandler, Session};
use anyhow::Result;
use tracing::debug;

/// Run the interactive terminal session.
pub async fn run_chat(api_key: Option<String>, settings: Settings) -> Result<()> {
    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let factory = ArxivAgentFactory::new(settings.clone(), prompts.clone())?;
    let handler = QueryHandler::new(prompts);
    let ctx = PageContext {
        factory: &factory,
        handler: &handler,
    };

    let mut session = Session::new();
    let mut page = TerminalPage::new(api_key, settings.output_dir());

    while !page.should_quit() {
        match render_page(&mut page, &mut session, &ctx).await {
            Ok(RenderOutcome::AwaitingCredential) if !page.should_quit() => {
                Output::warning("An API key is required to continue.");
            }
            Ok(outcome) => debug!("Render cycle finished: {:?}", outcome),
            Err(e) => {
                page.finish_spinner();
                Output::error(&format!("Query failed: {}", e));
            }
        }
    }

    if !session.transcript().is_empty() {
        Output::info(&format!(
            "Session ended with {} answered quer{}. Unsaved transcripts are discarded.",
            session.transcript().len(),
            if session.transcript().len() == 1 { "y" } else { "ies" }
        ));
    }
    Output::info("Goodbye!");

    Ok(())
}
