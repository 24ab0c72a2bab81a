// Retrieval-augmented query pipeline
//
// Components:
// - Context Builder: join retrieved passages into the user message
// - Pipeline: search -> prompt -> completion -> record turns

pub mod context;
pub mod pipeline;

// Re-export key types
pub use context::{ContextBuilder, PromptContext};
pub use pipeline::{PipelineConfig, QueryPipeline, DEFAULT_TOP_K, ERROR_PREFIX};
