// Context builder for retrieval-augmented prompts
use crate::types::Passage;

/// Separator between passages in the prompt context
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Prompt context assembled for a single turn; never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Passage texts joined with a blank line
    pub text: String,
    /// Number of passages included
    pub passage_count: usize,
}

impl PromptContext {
    pub fn is_empty(&self) -> bool {
        self.passage_count == 0
    }
}

/// Context builder for assembling the user message
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Join passage texts; no passages gives an empty context
    pub fn build(&self, passages: &[Passage]) -> PromptContext {
        let text = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        PromptContext {
            text,
            passage_count: passages.len(),
        }
    }

    /// The single user-role message sent alongside the system instruction
    pub fn user_message(&self, query: &str, context: &PromptContext) -> String {
        format!(
            "User query: {}\n\nRelevant context from book:\n{}",
            query, context.text
        )
    }
}
