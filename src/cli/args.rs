//! Command-line argument parsing for mlchat
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::config::Config;
use crate::completion::gemini::API_KEY_ENV;

/// mlchat - Ask machine-learning questions answered from a book index
#[derive(Parser, Debug)]
#[command(name = "mlchat")]
#[command(version)]
#[command(about = "Answer machine-learning questions with passages from a book index", long_about = None)]
pub struct Args {
    /// Question to answer once and exit
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Gemini model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Gemini API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Qdrant URL (overrides config)
    #[arg(long)]
    pub index_url: Option<String>,

    /// Collection holding the book chunks (overrides config)
    #[arg(long)]
    pub collection: Option<String>,

    /// Passages retrieved per question (overrides config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only the answer is printed)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start interactive chat
    Chat,

    /// Check API key, model endpoint and vector index
    Doctor,

    /// Display effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check that a question and a subcommand were not both given
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        if self.top_k == Some(0) {
            return Err("--top-k must be at least 1.".to_string());
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.completion.model = model.clone();
        }
        if let Some(url) = &self.index_url {
            config.index.url = url.clone();
        }
        if let Some(collection) = &self.collection {
            config.index.collection = collection.clone();
        }
        if let Some(top_k) = self.top_k {
            config.index.top_k = top_k;
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show the thinking spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Default log level for this crate when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["mlchat", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["mlchat"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["mlchat", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["mlchat", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_question_positional() {
        let args = parse(&["mlchat", "What is overfitting?"]);
        assert_eq!(args.question.as_deref(), Some("What is overfitting?"));
        assert!(args.command.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_subcommand() {
        let args = parse(&["mlchat", "doctor"]);
        assert_eq!(args.command, Some(Commands::Doctor));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let args = parse(&["mlchat", "-k", "0", "q"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "mlchat",
            "--model",
            "gemini-2.5-pro",
            "--collection",
            "book",
            "--index-url",
            "http://qdrant:6334",
            "-k",
            "5",
            "chat",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.completion.model, "gemini-2.5-pro");
        assert_eq!(config.index.collection, "book");
        assert_eq!(config.index.url, "http://qdrant:6334");
        assert_eq!(config.index.top_k, 5);
    }

    #[test]
    fn test_override_repairs_file_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[index]\ntop_k = 0\n").unwrap();

        let args = parse(&["mlchat", "-k", "3", "q"]);
        let mut config = Config::load(Some(&path)).unwrap();
        args.apply_overrides(&mut config);

        assert_eq!(config.index.top_k, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert_eq!(Verbosity::Verbose.log_level(), "info");
        assert_eq!(Verbosity::VeryVerbose.as_str(), "very_verbose");
    }
}
