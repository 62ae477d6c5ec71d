//! The arxiv-qa page, independent of how it is displayed.
//!
//! A render cycle runs the page top to bottom once: header, credential
//! field, query field, answer, transcript download. Hosts implement [`Page`]
//! to supply input values and display output; the cycle itself never knows
//! whether it is drawing HTML or writing to a terminal.

mod html;
mod terminal;

pub use html::{escape_html, HtmlPage};
pub use terminal::TerminalPage;

use crate::agent::AgentFactory;
use crate::credential::Credential;
use crate::error::Result;
use crate::session::{Download, QueryHandler, Session};
use tracing::debug;

/// Page title.
pub const PAGE_TITLE: &str = "🔎 ArXiv QA Bot";

/// Introductory text under the title.
pub const PAGE_INTRO: &str = "Welcome to ArXiv QA Bot, a tool that lets you search and chat \
    with research papers from arXiv.";

/// A text field on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputField {
    /// Stable key used by hosts (e.g. the HTML form field name).
    pub key: &'static str,
    pub label: &'static str,
    /// Whether the value is secret and must be masked.
    pub masked: bool,
    pub help: Option<&'static str>,
}

/// The credential field.
pub const API_KEY_FIELD: InputField = InputField {
    key: "api_key",
    label: "OpenAI API Key",
    masked: true,
    help: Some("Don't have an API key? Get one at https://platform.openai.com/account/api-keys."),
};

/// The query field.
pub const QUERY_FIELD: InputField = InputField {
    key: "query",
    label: "Enter the ArXiv search query:",
    masked: false,
    help: None,
};

/// Display capabilities a host provides to the page.
pub trait Page {
    /// Show the page title and introduction.
    fn header(&mut self, title: &str, intro: &str);

    /// Show a text field and return its current value.
    fn text_input(&mut self, field: &InputField) -> String;

    /// Show a block of text verbatim.
    fn render_text(&mut self, content: &str);

    /// Offer a file for download.
    fn offer_download(&mut self, download: &Download);
}

/// Where a render cycle stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No credential yet; nothing below the credential field was shown.
    AwaitingCredential,
    /// Credential present, no query submitted this cycle.
    AwaitingQuery,
    /// A query was answered this cycle.
    Answered(String),
}

/// Settings a render cycle needs beyond the session itself.
pub struct PageContext<'a> {
    pub factory: &'a dyn AgentFactory,
    pub handler: &'a QueryHandler,
}

/// Run one top-to-bottom render cycle of the page.
///
/// A failed round-trip returns the error before the download is offered,
/// leaving the transcript as it was.
pub async fn render_page<P: Page + Send>(
    page: &mut P,
    session: &mut Session,
    ctx: &PageContext<'_>,
) -> Result<RenderOutcome> {
    page.header(PAGE_TITLE, PAGE_INTRO);

    let credential = match Credential::from_input(&page.text_input(&API_KEY_FIELD)) {
        Some(credential) => credential,
        None => {
            debug!("No credential, stopping render");
            return Ok(RenderOutcome::AwaitingCredential);
        }
    };

    let agent = session.agent_for(&credential, ctx.factory)?;

    let query = page.text_input(&QUERY_FIELD);
    let answer = ctx
        .handler
        .handle(agent.as_ref(), session.transcript_mut(), &query)
        .await?;

    if let Some(ref content) = answer {
        page.render_text(content);
    }

    if let Some(download) = session.transcript().export() {
        page.offer_download(&download);
    }

    Ok(match answer {
        Some(content) => RenderOutcome::Answered(content),
        None => RenderOutcome::AwaitingQuery,
    })
}
