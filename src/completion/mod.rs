//! Completion client abstraction
//!
//! The pipeline only ever makes one call shape: a system instruction plus a
//! single user message. Providers implement [`CompletionClient`].

pub mod gemini;

use async_trait::async_trait;

use crate::errors::Result;

pub use gemini::GeminiClient;

/// Hosted text-generation model
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a single non-streaming reply.
    ///
    /// Any transport, auth, quota or provider failure is returned as
    /// [`ChatError::Completion`](crate::errors::ChatError::Completion).
    async fn complete(&self, system_instruction: &str, user_message: &str) -> Result<String>;

    /// Model identifier, for display and logs
    fn model(&self) -> &str;
}
