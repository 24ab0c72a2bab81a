//! mlchat - retrieval-augmented chat about machine learning
//!
//! Each question is embedded, matched against a Qdrant collection of book
//! passages, and answered by a hosted Gemini model with those passages as
//! context.
//!
//! # Architecture
//!
//! - **index**: vector search over the book (`VectorIndex`)
//! - **completion**: hosted model calls (`CompletionClient`)
//! - **conversation**: the ordered turns of one session
//! - **rag**: the query pipeline tying the three together
//! - **repl** / **cli**: terminal surfaces

pub mod errors;
pub mod types;
pub mod logging;

pub use errors::{ChatError, Result};

// Collaborators
pub mod index;
pub mod completion;

// Session state and turn handling
pub mod conversation;
pub mod rag;

// Terminal surfaces
pub mod cli;
pub mod repl;
pub mod doctor;
