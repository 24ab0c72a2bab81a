//! REPL (Read-Eval-Print Loop) module for the interactive chat
//!
//! Owns the conversation for one terminal session and hands each question
//! to the shared query pipeline. Built-in commands start with `/`.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::conversation::ConversationState;
use crate::rag::QueryPipeline;
use crate::repl::commands::{is_command, CommandHandler, StatusInfo};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, ReadOutcome};
use crate::types::TurnOutcome;

/// Configuration for REPL mode
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub history_file: Option<PathBuf>,
    pub show_progress: bool,
    pub verbose: bool,
    pub system_instruction: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            history_file: None,
            show_progress: true,
            verbose: false,
            system_instruction: crate::conversation::DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

/// REPL session coordinator
///
/// Ties together:
/// - Input handling (rustyline)
/// - Command processing
/// - The conversation for this session
/// - Display coordination
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    display_manager: DisplayManager,
    state: ConversationState,
    pipeline: QueryPipeline,
}

impl ReplSession {
    /// Create new REPL session
    pub fn new(pipeline: QueryPipeline, config: ReplConfig) -> Result<Self> {
        let input_handler = match config.history_file {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        let status = StatusInfo {
            model: pipeline.model().to_string(),
            index: pipeline.index_description(),
            top_k: pipeline.config().top_k,
        };
        let mut command_handler = CommandHandler::new().with_status(status);
        command_handler.set_verbose(config.verbose);

        let display_manager = if config.show_progress {
            DisplayManager::new()
        } else {
            DisplayManager::quiet()
        };

        Ok(ReplSession {
            input_handler,
            command_handler,
            display_manager,
            state: ConversationState::new(config.system_instruction),
            pipeline,
        })
    }

    /// Show welcome banner
    pub fn show_welcome(&self, version: &str) {
        self.display_manager.show_banner(
            version,
            self.pipeline.model(),
            &self.pipeline.index_description(),
        );
    }

    /// Handle user input (command or question)
    ///
    /// Returns true if session should continue, false to exit
    pub async fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        if is_command(input) {
            let command = self.command_handler.parse(input);
            return self.command_handler.execute(command, &mut self.state, &self.display_manager);
        }

        let _spinner = self.display_manager.start_thinking();
        let outcome = self.pipeline.handle_user_turn(&mut self.state, input).await;
        let verbose = self.command_handler.is_verbose();
        self.display_manager.render_outcome(&outcome, verbose);

        if let TurnOutcome::Failed { kind, .. } = &outcome {
            tracing::debug!(?kind, "turn ended with an error reply");
        }

        Ok(true)
    }

    /// Run the read-eval-print loop until `/exit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.input_handler.read_line()? {
                ReadOutcome::Line(line) => {
                    match self.handle_input(&line).await {
                        Ok(true) => continue,
                        Ok(false) => break,
                        Err(e) => {
                            self.display_manager.show_error(&format!("{}", e));
                            continue;
                        }
                    }
                }
                ReadOutcome::Interrupted => {
                    println!("{}", "Use /exit to quit".yellow());
                    continue;
                }
                ReadOutcome::Eof => {
                    println!("{}", "Goodbye!".green());
                    break;
                }
            }
        }

        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "could not save input history");
        }

        Ok(())
    }

    /// Conversation so far
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Get display manager
    pub fn display(&self) -> &DisplayManager {
        &self.display_manager
    }

    /// Save input history
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClient;
    use crate::errors::{ChatError, Result as ChatResult};
    use crate::index::VectorIndex;
    use crate::types::{Passage, Role};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OnePassage;

    #[async_trait]
    impl VectorIndex for OnePassage {
        async fn search(&self, _query: &str, _k: usize) -> ChatResult<Vec<Passage>> {
            Ok(vec![Passage::new("Gradient descent tweaks parameters iteratively.")])
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    struct Echo;

    #[async_trait]
    impl CompletionClient for Echo {
        async fn complete(&self, _system: &str, user: &str) -> ChatResult<String> {
            if user.contains("fail please") {
                return Err(ChatError::completion("timeout"));
            }
            Ok(format!("echo ({} chars)", user.len()))
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn session() -> ReplSession {
        let pipeline = QueryPipeline::new(Arc::new(OnePassage), Arc::new(Echo));
        let config = ReplConfig {
            show_progress: false,
            ..Default::default()
        };
        ReplSession::new(pipeline, config).unwrap()
    }

    #[test]
    fn test_repl_config_default() {
        let config = ReplConfig::default();
        assert!(config.show_progress);
        assert!(!config.verbose);
        assert!(config.history_file.is_none());
    }

    #[tokio::test]
    async fn test_handle_command() {
        let mut session = session();
        assert!(session.handle_input("/help").await.unwrap());
        assert!(!session.handle_input("/exit").await.unwrap());
    }

    #[tokio::test]
    async fn test_handle_empty_input() {
        let mut session = session();
        assert!(session.handle_input("").await.unwrap());
        assert!(session.handle_input("   ").await.unwrap());
        assert!(session.state().is_empty());
    }

    #[tokio::test]
    async fn test_question_appends_two_turns() {
        let mut session = session();
        assert!(session.handle_input("What is gradient descent?").await.unwrap());

        let turns = session.state().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].content(), "What is gradient descent?");
        assert!(turns[1].content().starts_with("echo"));
    }

    #[tokio::test]
    async fn test_failed_question_keeps_session_alive() {
        let mut session = session();
        assert!(session.handle_input("fail please").await.unwrap());
        assert_eq!(session.state().turns()[1].content(), "Error: timeout");
    }

    #[tokio::test]
    async fn test_reset_clears_conversation() {
        let mut session = session();
        session.handle_input("What is bagging?").await.unwrap();
        let before = session.state().id();

        session.handle_input("/reset").await.unwrap();
        assert!(session.state().is_empty());
        assert_ne!(session.state().id(), before);
    }

    #[tokio::test]
    async fn test_verbose_from_config_and_command() {
        let pipeline = QueryPipeline::new(Arc::new(OnePassage), Arc::new(Echo));
        let config = ReplConfig {
            show_progress: false,
            verbose: true,
            ..Default::default()
        };
        let mut session = ReplSession::new(pipeline, config).unwrap();
        assert!(session.command_handler.is_verbose());

        session.handle_input("/verbose off").await.unwrap();
        assert!(!session.command_handler.is_verbose());
    }
}
