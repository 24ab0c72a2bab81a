//! Session-scoped conversation state

pub mod state;

pub use state::{ConversationState, DEFAULT_SYSTEM_INSTRUCTION};
