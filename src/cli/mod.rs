//! CLI module for arxiv-qa.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ArXiv QA Bot
///
/// Ask research questions and get answers with arXiv references, in the
/// browser or the terminal.
#[derive(Parser, Debug)]
#[command(name = "arxiv-qa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web page
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive session in the terminal
    Chat {
        /// OpenAI API key (prompted for if not given)
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Ask a single question
    Ask {
        /// The query to ask
        query: String,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Write the transcript to this file
        #[arg(short, long)]
        transcript: Option<String>,
    },

    /// Search arXiv directly, without the model
    Search {
        /// Search query (arXiv query syntax, e.g. "ti:attention AND cat:cs.CL")
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "5")]
        limit: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "arxiv-qa",
            "-vv",
            "ask",
            "What is attention?",
            "--api-key",
            "sk-test",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { query, api_key, transcript } => {
                assert_eq!(query, "What is attention?");
                assert_eq!(api_key.as_deref(), Some("sk-test"));
                assert_eq!(transcript, None);
            }
            other => panic!("Expected Ask, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["arxiv-qa", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
            }
            other => panic!("Expected Serve, got {:?}", other),
        }
    }
}
