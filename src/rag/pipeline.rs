// End-to-end query pipeline: retrieve -> build prompt -> complete -> record
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::completion::CompletionClient;
use crate::conversation::ConversationState;
use crate::errors::{ChatError, Result};
use crate::index::VectorIndex;
use crate::rag::context::ContextBuilder;
use crate::types::{Turn, TurnOutcome};

/// Prefix on every assistant turn that reports a failure
pub const ERROR_PREFIX: &str = "Error: ";

/// Default retrieval depth
pub const DEFAULT_TOP_K: usize = 3;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Passages requested per query
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Retrieval-augmented query pipeline.
///
/// Holds the process-wide collaborator handles; conversation state is
/// passed in per call so one pipeline can serve several sessions.
#[derive(Clone)]
pub struct QueryPipeline {
    index: Arc<dyn VectorIndex>,
    completion: Arc<dyn CompletionClient>,
    context_builder: ContextBuilder,
    config: PipelineConfig,
}

impl QueryPipeline {
    /// Create pipeline with default retrieval depth
    pub fn new(index: Arc<dyn VectorIndex>, completion: Arc<dyn CompletionClient>) -> Self {
        Self::with_config(index, completion, PipelineConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            index,
            completion,
            context_builder: ContextBuilder::new(),
            config,
        }
    }

    /// Handle one user submission.
    ///
    /// Empty input records nothing. Otherwise exactly one user turn and one
    /// assistant turn are appended, in that order, whatever the collaborators do.
    pub async fn handle_user_turn(&self, state: &mut ConversationState, input: &str) -> TurnOutcome {
        if input.trim().is_empty() {
            return TurnOutcome::Skipped;
        }

        let span = tracing::info_span!("turn", session = %state.id(), turn = state.len() / 2 + 1);
        async move {
            let started = Instant::now();
            state.push(Turn::user(input));

            match self.answer(state.system_instruction(), input).await {
                Ok((text, passages_used)) => {
                    let reply = Turn::assistant(text);
                    state.push(reply.clone());
                    tracing::info!(passages_used, elapsed_ms = started.elapsed().as_millis() as u64, "turn answered");
                    TurnOutcome::Answered {
                        reply,
                        passages_used,
                        duration: started.elapsed(),
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "turn failed");
                    let reply = Turn::assistant(format!("{}{}", ERROR_PREFIX, err));
                    state.push(reply.clone());
                    TurnOutcome::Failed {
                        reply,
                        kind: err.kind(),
                        duration: started.elapsed(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Retrieve context and ask the model. Returns the reply and passage count.
    async fn answer(&self, system_instruction: &str, input: &str) -> Result<(String, usize)> {
        let search_started = Instant::now();
        let passages = self.index.search(input, self.config.top_k).await?;
        tracing::debug!(
            found = passages.len(),
            elapsed_ms = search_started.elapsed().as_millis() as u64,
            "retrieved passages"
        );

        let context = self.context_builder.build(&passages);
        if context.is_empty() {
            tracing::debug!("no passages retrieved; generating without book context");
        }
        let message = self.context_builder.user_message(input, &context);

        let completion_started = Instant::now();
        let text = self.completion.complete(system_instruction, &message).await?;
        tracing::debug!(
            model = self.completion.model(),
            chars = text.len(),
            elapsed_ms = completion_started.elapsed().as_millis() as u64,
            "completion received"
        );

        Ok((text, context.passage_count))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        self.completion.model()
    }

    pub fn index_description(&self) -> String {
        self.index.describe()
    }
}

/// Validate a pipeline configuration
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.top_k == 0 {
        return Err(ChatError::ConfigError("top_k must be at least 1".to_string()));
    }
    Ok(())
}
