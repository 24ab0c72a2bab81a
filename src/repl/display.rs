//! Display manager for REPL terminal UI
//!
//! Renders role-tagged turns, the thinking spinner and status messages.

use colored::*;
use crossterm::{
    cursor,
    execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::types::{Role, Turn, TurnOutcome};

/// Display manager for REPL UI
pub struct DisplayManager {
    current_spinner: Option<ProgressBar>,
    tick_interval: Duration,
    show_progress: bool,
}

impl DisplayManager {
    /// Create new display manager
    ///
    /// Spinner tick: 100ms
    pub fn new() -> Self {
        DisplayManager {
            current_spinner: None,
            tick_interval: Duration::from_millis(100),
            show_progress: true,
        }
    }

    /// Display manager that never draws the spinner
    pub fn quiet() -> Self {
        DisplayManager {
            show_progress: false,
            ..Self::new()
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, index: &str) {
        let width = 64;
        let rule = "=".repeat(width);
        let title = format!("  Hands-on Machine Learning Chatbot {}", version);
        let info = format!("  Model: {} | Index: {}", model, index);

        println!("\n{}", rule.cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule.cyan());
        println!("Enter your query about machine learning (or {} for commands, {} to quit)\n",
            "/help".green(), "/exit".green());
    }

    /// Start the "Thinking..." spinner
    pub fn start_thinking(&mut self) -> ProgressBar {
        self.finish_current();

        let pb = if self.show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        );
        pb.set_message("Thinking...");
        pb.enable_steady_tick(self.tick_interval);

        self.current_spinner = Some(pb.clone());
        pb
    }

    /// Stop and clear the spinner, if any
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Render one turn with its role tag
    pub fn render_turn(&self, turn: &Turn) {
        println!("{}", Self::role_tag(turn.role()));
        if turn.role() == Role::Assistant && turn.content().starts_with(crate::rag::ERROR_PREFIX) {
            println!("{}\n", turn.content().red());
        } else {
            println!("{}\n", turn.content());
        }
    }

    /// Render a run of turns, oldest first
    pub fn render_turns(&self, turns: &[Turn]) {
        for turn in turns {
            self.render_turn(turn);
        }
    }

    /// Re-render after a submission: the new assistant turn plus timing when verbose
    pub fn render_outcome(&mut self, outcome: &TurnOutcome, verbose: bool) {
        self.finish_current();

        if let Some(reply) = outcome.reply() {
            self.render_turn(reply);
        }

        if verbose {
            println!("{}\n", outcome.summary().dimmed());
        }
    }

    fn role_tag(role: Role) -> ColoredString {
        match role {
            Role::User => "You:".green().bold(),
            Role::Assistant => "Assistant:".cyan().bold(),
        }
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(
            io::stdout(),
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;

    #[test]
    fn test_display_manager_creation() {
        let manager = DisplayManager::new();
        assert!(manager.current_spinner.is_none());
        assert_eq!(manager.tick_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_start_and_finish_thinking() {
        let mut manager = DisplayManager::quiet();
        let _pb = manager.start_thinking();
        assert!(manager.current_spinner.is_some());

        manager.finish_current();
        assert!(manager.current_spinner.is_none());
    }

    #[test]
    fn test_render_outcome_clears_spinner() {
        let mut manager = DisplayManager::quiet();
        let _pb = manager.start_thinking();

        let outcome = TurnOutcome::Failed {
            reply: Turn::assistant("Error: timeout"),
            kind: FailureKind::Completion,
            duration: Duration::from_millis(5),
        };
        manager.render_outcome(&outcome, true);
        assert!(manager.current_spinner.is_none());
    }

    #[test]
    fn test_render_turns() {
        let manager = DisplayManager::new();
        manager.render_turns(&[Turn::user("What is bagging?"), Turn::assistant("Bootstrap aggregating.")]);
    }

    #[test]
    fn test_message_display() {
        let manager = DisplayManager::new();
        manager.show_error("Test error");
        manager.show_warning("Test warning");
        manager.show_section("Section");
    }
}
