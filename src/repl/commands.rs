//! Command handler for REPL built-in commands
//!
//! Anything starting with `/` is a command; everything else is a question.

use anyhow::Result;
use colored::*;

use crate::conversation::ConversationState;
use crate::repl::display::DisplayManager;

/// Default number of turns shown by `/history`
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Status,
    Reset,
    Verbose { enable: bool },
    Clear,
    Exit,
    Unknown { input: String },
}

/// Static facts shown by `/status`
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub model: String,
    pub index: String,
    pub top_k: usize,
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    verbose: bool,
    status: StatusInfo,
}

impl CommandHandler {
    /// Create new command handler
    pub fn new() -> Self {
        CommandHandler {
            verbose: false,
            status: StatusInfo::default(),
        }
    }

    /// Attach the facts shown by `/status`
    pub fn with_status(mut self, status: StatusInfo) -> Self {
        self.status = status;
        self
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown { input: input.to_string() };
        }

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "status" => Command::Status,
            "reset" => Command::Reset,
            "verbose" => {
                let enable = parts.get(1)
                    .map(|s| matches!(s.to_lowercase().as_str(), "on" | "1" | "true"))
                    .unwrap_or(true);
                Command::Verbose { enable }
            }
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &mut self,
        command: Command,
        state: &mut ConversationState,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(true)
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                Ok(false)
            }
            Command::History { limit } => {
                self.show_history(state, display, limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
                Ok(true)
            }
            Command::Status => {
                self.show_status(state);
                Ok(true)
            }
            Command::Reset => {
                state.reset();
                tracing::info!(session = %state.id(), "session reset");
                println!("{}", "Session reset. Conversation cleared.".yellow());
                Ok(true)
            }
            Command::Verbose { enable } => {
                self.verbose = enable;
                let status = if enable { "enabled" } else { "disabled" };
                println!("{}", format!("Verbose mode {}", status).cyan());
                Ok(true)
            }
            Command::Clear => {
                display.clear_screen()?;
                Ok(true)
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Ok(true)
            }
        }
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/history [n]", "Show the last n messages (default: 10)"),
            ("/status", "Show session status"),
            ("/reset", "Start a new conversation"),
            ("/verbose [on|off]", "Toggle timing details after answers"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type your question directly (no / prefix)");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display recent turns
    fn show_history(&self, state: &ConversationState, display: &DisplayManager, limit: usize) {
        let turns = state.recent(limit);

        if turns.is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        display.show_section(&format!("Conversation (last {} of {}):", turns.len(), state.len()));
        if !self.verbose {
            display.render_turns(turns);
            return;
        }

        for turn in turns {
            println!("{}", turn.created_at().format("%H:%M:%S").to_string().dimmed());
            display.render_turn(turn);
        }
    }

    /// Display session status
    fn show_status(&self, state: &ConversationState) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let duration = state.session_duration();
        let minutes = duration / 60;
        let seconds = duration % 60;
        let duration_str = if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        };

        println!("  Session:          {}", state.id().to_string().dimmed());
        println!("  Questions:        {}", state.exchange_count().to_string().green());
        println!("  Messages:         {}", state.len().to_string().green());
        println!("  Session Duration: {}", duration_str.green());
        println!("  Model:            {}", self.status.model.green());
        println!("  Index:            {}", self.status.index.green());
        println!("  Passages (k):     {}", self.status.top_k.to_string().green());
        println!("  Verbose Mode:     {}", if self.verbose { "On".green() } else { "Off".red() });
        println!();
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode
    pub fn set_verbose(&mut self, enable: bool) {
        self.verbose = enable;
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_command() {
        assert!(is_command("/help"));
        assert!(is_command(" /help"));
        assert!(!is_command("help"));
        assert!(!is_command("What is a ROC curve?"));
    }

    #[test]
    fn test_parse_basic_commands() {
        let handler = CommandHandler::new();
        assert_eq!(handler.parse("/help"), Command::Help);
        assert_eq!(handler.parse("/h"), Command::Help);
        assert_eq!(handler.parse("/status"), Command::Status);
        assert_eq!(handler.parse("/reset"), Command::Reset);
        assert_eq!(handler.parse("/cls"), Command::Clear);
    }

    #[test]
    fn test_parse_exit() {
        let handler = CommandHandler::new();
        assert_eq!(handler.parse("/exit"), Command::Exit);
        assert_eq!(handler.parse("/quit"), Command::Exit);
        assert_eq!(handler.parse("/Q"), Command::Exit);
    }

    #[test]
    fn test_parse_history() {
        let handler = CommandHandler::new();
        assert_eq!(handler.parse("/history"), Command::History { limit: None });
        assert_eq!(handler.parse("/history 4"), Command::History { limit: Some(4) });
        assert_eq!(handler.parse("/history lots"), Command::History { limit: None });
    }

    #[test]
    fn test_parse_verbose() {
        let handler = CommandHandler::new();
        assert_eq!(handler.parse("/verbose"), Command::Verbose { enable: true });
        assert_eq!(handler.parse("/verbose ON"), Command::Verbose { enable: true });
        assert_eq!(handler.parse("/verbose off"), Command::Verbose { enable: false });
    }

    #[test]
    fn test_parse_unknown() {
        let handler = CommandHandler::new();
        assert!(matches!(handler.parse("/sources"), Command::Unknown { .. }));
        assert!(matches!(handler.parse("/"), Command::Unknown { .. }));
        assert!(matches!(handler.parse("explain SVMs"), Command::Unknown { .. }));
    }

    #[test]
    fn test_execute_exit() {
        let mut handler = CommandHandler::new();
        let mut state = ConversationState::default();
        let display = DisplayManager::quiet();

        let result = handler.execute(Command::Exit, &mut state, &display).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_execute_reset() {
        let mut handler = CommandHandler::new();
        let mut state = ConversationState::new("Be precise.");
        let display = DisplayManager::quiet();
        state.push(crate::types::Turn::user("q"));
        state.push(crate::types::Turn::assistant("a"));

        let result = handler.execute(Command::Reset, &mut state, &display).unwrap();

        assert!(result);
        assert!(state.is_empty());
        assert_eq!(state.system_instruction(), "Be precise.");
    }

    #[test]
    fn test_execute_verbose() {
        let mut handler = CommandHandler::new();
        let mut state = ConversationState::default();
        let display = DisplayManager::quiet();

        handler.execute(Command::Verbose { enable: true }, &mut state, &display).unwrap();
        assert!(handler.is_verbose());

        handler.execute(Command::Verbose { enable: false }, &mut state, &display).unwrap();
        assert!(!handler.is_verbose());
    }

    #[test]
    fn test_execute_status_and_history() {
        let mut handler = CommandHandler::new().with_status(StatusInfo {
            model: "gemini-2.5-flash-lite".to_string(),
            index: "qdrant".to_string(),
            top_k: 3,
        });
        let mut state = ConversationState::default();
        let display = DisplayManager::quiet();

        assert!(handler.execute(Command::Status, &mut state, &display).unwrap());
        assert!(handler.execute(Command::History { limit: Some(2) }, &mut state, &display).unwrap());
    }

    #[test]
    fn test_history_with_turns_in_both_modes() {
        let mut handler = CommandHandler::new();
        let mut state = ConversationState::default();
        let display = DisplayManager::quiet();
        state.push(crate::types::Turn::user("What is dropout?"));
        state.push(crate::types::Turn::assistant("Randomly zeroing activations."));

        assert!(handler.execute(Command::History { limit: None }, &mut state, &display).unwrap());

        handler.set_verbose(true);
        assert!(handler.execute(Command::History { limit: Some(1) }, &mut state, &display).unwrap());
        assert_eq!(state.len(), 2);
    }
}
