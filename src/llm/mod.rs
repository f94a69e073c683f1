//! Generation collaborator.
//!
//! The engine phrases its replies through an [`LlmProvider`]. The only
//! shipped backend speaks the OpenAI Chat Completions API, which covers
//! OpenAI itself, OpenRouter, Ollama, LM Studio and most hosted gateways.

mod openai_compatible;
mod provider;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Create an LLM provider based on configuration.
pub fn create_llm_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiCompatibleProvider::new(config.clone())?;
    tracing::info!(
        "Using OpenAI-compatible endpoint (base_url: {}, model: {})",
        config.base_url,
        config.model
    );
    Ok(Arc::new(provider))
}
