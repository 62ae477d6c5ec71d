//! Search command implementation.

use crate::arxiv::{ArxivClient, PaperSearch};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command against arXiv directly.
pub async fn run_search(query: &str, limit: u32, settings: Settings) -> Result<()> {
    let client = ArxivClient::new(&settings.arxiv)?;

    let spinner = Output::spinner("Searching arXiv...");
    let papers = client.search(query, limit).await;
    spinner.finish_and_clear();

    let papers = papers?;

    if papers.is_empty() {
        Output::info("No papers found.");
        return Ok(());
    }

    Output::header(&format!("Found {} paper(s)", papers.len()));
    for (i, paper) in papers.iter().enumerate() {
        let url = paper.pdf_url.as_deref().unwrap_or(&paper.entry_url);
        Output::paper(i + 1, &paper.title, &paper.id, &paper.authors, url);
    }
    println!();

    Ok(())
}
