//! Terminal rendering of the page for interactive use.

use super::{InputField, Page};
use crate::cli::Output;
use crate::error::Result;
use crate::session::Download;
use console::{style, Term};
use indicatif::ProgressBar;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

/// Where typed lines come from.
enum Input {
    /// Interactive terminal; the credential is read hidden.
    Term(Term),
    /// Plain line source such as piped stdin. End of input ends the session.
    Lines(Box<dyn BufRead + Send>),
}

/// Page implementation that prompts on the terminal.
///
/// Every line typed at the query prompt drives one render cycle. The
/// credential is asked for once (hidden) unless one was supplied up front.
pub struct TerminalPage {
    input: Input,
    credential: Option<String>,
    output_dir: PathBuf,
    pending: Option<Download>,
    spinner: Option<ProgressBar>,
    header_shown: bool,
    quit: bool,
}

impl TerminalPage {
    pub fn new(credential: Option<String>, output_dir: PathBuf) -> Self {
        let term = Term::stdout();
        let input = if term.is_term() {
            Input::Term(term)
        } else {
            Input::Lines(Box::new(BufReader::new(io::stdin())))
        };
        Self::with_input(input, credential, output_dir)
    }

    /// Read lines from `reader` instead of the terminal.
    pub fn from_reader(
        reader: impl BufRead + Send + 'static,
        credential: Option<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self::with_input(Input::Lines(Box::new(reader)), credential, output_dir)
    }

    fn with_input(input: Input, credential: Option<String>, output_dir: PathBuf) -> Self {
        Self {
            input,
            credential,
            output_dir,
            pending: None,
            spinner: None,
            header_shown: false,
            quit: false,
        }
    }

    /// Whether the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Clear the progress spinner shown while a query runs.
    pub fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Write the currently offered download to the output directory.
    pub fn save_pending(&self) -> Result<Option<PathBuf>> {
        let Some(download) = &self.pending else {
            return Ok(None);
        };

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(&download.file_name);
        std::fs::write(&path, &download.content)?;
        Ok(Some(path))
    }

    /// Read one line without its line ending.
    ///
    /// End of input or a read failure ends the session and yields `None`.
    fn next_line(&mut self, hidden: bool) -> Option<String> {
        let line = match &mut self.input {
            Input::Term(term) if hidden => term.read_secure_line().map(Some),
            Input::Term(term) => term.read_line().map(Some),
            Input::Lines(reader) => {
                let mut buf = String::new();
                reader.read_line(&mut buf).map(|read| {
                    (read > 0).then(|| buf.trim_end_matches(['\r', '\n']).to_string())
                })
            }
        };

        match line {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                println!();
                self.quit = true;
                None
            }
            Err(e) => {
                Output::error(&format!("Failed to read input: {}", e));
                self.quit = true;
                None
            }
        }
    }

    fn read_credential(&mut self, field: &InputField) -> String {
        if let Some(ref credential) = self.credential {
            return credential.clone();
        }

        if let Some(help) = field.help {
            Output::info(help);
        }
        print!("{} ", style(format!("{}:", field.label)).bold());
        io::stdout().flush().ok();

        let Some(value) = self.next_line(true) else {
            return String::new();
        };

        if !value.is_empty() {
            self.credential = Some(value.clone());
        }
        value
    }

    fn read_query(&mut self, field: &InputField) -> String {
        print!("{} ", style(field.label).green().bold());
        io::stdout().flush().ok();

        let Some(line) = self.next_line(false) else {
            return String::new();
        };

        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            self.quit = true;
            return String::new();
        }

        if input.eq_ignore_ascii_case("save") {
            match self.save_pending() {
                Ok(Some(path)) => Output::success(&format!("Transcript saved to {}", path.display())),
                Ok(None) => Output::warning("Nothing to save yet."),
                Err(e) => Output::error(&format!("Failed to save transcript: {}", e)),
            }
            return String::new();
        }

        if !line.is_empty() {
            self.spinner = Some(Output::spinner("Searching arXiv..."));
        }
        line
    }
}

impl Page for TerminalPage {
    fn header(&mut self, title: &str, intro: &str) {
        if self.header_shown {
            return;
        }
        self.header_shown = true;

        println!("\n{}", style(title).bold().cyan());
        println!("{}", style(intro).dim());
        println!(
            "{}\n",
            style("Type your query, 'save' to write the transcript, or 'exit' to quit.").dim()
        );
    }

    fn text_input(&mut self, field: &InputField) -> String {
        self.finish_spinner();
        if self.quit {
            return String::new();
        }

        if field.masked {
            self.read_credential(field)
        } else {
            self.read_query(field)
        }
    }

    fn render_text(&mut self, content: &str) {
        self.finish_spinner();
        println!("\n{}\n", content);
    }

    fn offer_download(&mut self, download: &Download) {
        if self.pending.as_ref() != Some(download) {
            Output::info(&format!(
                "Transcript updated. Type 'save' to write {}.",
                download.file_name
            ));
            self.pending = Some(download.clone());
        }
    }
}
