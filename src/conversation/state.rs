//! Conversation state for one chat session
//!
//! Holds the fixed system instruction and the display history of turns.
//! Owned by exactly one session; the pipeline borrows it mutably per turn.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{Role, Turn};

/// Instruction sent as the system message on every completion call
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert on machine learning. \
You will give precise answers on every query asked by the user. \
Make sure to use the context given to you from a book on machine learning to support your answer.";

/// Session-scoped conversation state
///
/// Tracks:
/// - The system instruction (fixed at creation)
/// - Turns in submission order (append-only until reset)
/// - Session id and start time
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: Uuid,
    system_instruction: String,
    turns: Vec<Turn>,
    started_at: DateTime<Utc>,
}

impl ConversationState {
    /// Create a new session with the given system instruction
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            system_instruction: system_instruction.into(),
            turns: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Up to `limit` most recent turns, oldest first
    pub fn recent(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Clear all turns and start a fresh session.
    ///
    /// The system instruction survives; the id and start time do not.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of user submissions recorded in this session
    pub fn exchange_count(&self) -> usize {
        self.turns.iter().filter(|t| t.role() == Role::User).count()
    }

    /// Session duration in seconds
    pub fn session_duration(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_INSTRUCTION)
    }
}
