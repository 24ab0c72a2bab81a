//! Type definitions module
//!
//! Core types for the conversation and for turn results.

pub mod messages;

// Re-export commonly used types
pub use messages::{Passage, Role, Turn};

// Turn result types
pub mod outcome;
pub use outcome::TurnOutcome;
