//! Turn outcome types shared by the one-shot CLI and the REPL
//!
//! The pipeline hands one of these back after every submission so the
//! presentation layer knows what to re-render.

use std::time::Duration;

use crate::errors::FailureKind;
use crate::types::messages::Turn;

/// What happened to a single submission
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Empty input; nothing was recorded and no collaborator was called
    Skipped,

    /// Both turns were recorded; `reply` is the assistant turn
    Answered {
        reply: Turn,
        passages_used: usize,
        duration: Duration,
    },

    /// Both turns were recorded; `reply` carries the `Error: ` message
    Failed {
        reply: Turn,
        kind: FailureKind,
        duration: Duration,
    },
}

impl TurnOutcome {
    /// The assistant turn appended by this submission, if any
    pub fn reply(&self) -> Option<&Turn> {
        match self {
            TurnOutcome::Skipped => None,
            TurnOutcome::Answered { reply, .. } | TurnOutcome::Failed { reply, .. } => Some(reply),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TurnOutcome::Failed { .. })
    }

    /// Get a human-readable summary of the turn
    pub fn summary(&self) -> String {
        match self {
            TurnOutcome::Skipped => "Skipped (empty input)".to_string(),
            TurnOutcome::Answered {
                passages_used,
                duration,
                ..
            } => format!(
                "Answered in {:.2}s ({} passages)",
                duration.as_secs_f64(),
                passages_used
            ),
            TurnOutcome::Failed { kind, duration, .. } => {
                let side = match kind {
                    FailureKind::Index => "index",
                    FailureKind::Completion => "completion",
                    FailureKind::Other => "internal",
                };
                format!("Failed ({}) in {:.2}s", side, duration.as_secs_f64())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_has_no_reply() {
        let outcome = TurnOutcome::Skipped;
        assert!(outcome.reply().is_none());
        assert!(!outcome.is_failure());
        assert!(outcome.summary().contains("Skipped"));
    }

    #[test]
    fn test_answered_summary() {
        let outcome = TurnOutcome::Answered {
            reply: Turn::assistant("Done"),
            passages_used: 3,
            duration: Duration::from_millis(2500),
        };

        assert_eq!(outcome.reply().map(|t| t.content()), Some("Done"));
        let summary = outcome.summary();
        assert!(summary.contains("2.50s"));
        assert!(summary.contains("3 passages"));
    }

    #[test]
    fn test_failed_summary() {
        let outcome = TurnOutcome::Failed {
            reply: Turn::assistant("Error: timeout"),
            kind: FailureKind::Completion,
            duration: Duration::from_secs(2),
        };

        assert!(outcome.is_failure());
        assert!(outcome.summary().contains("completion"));
    }
}
