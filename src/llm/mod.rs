//! Hosted language model seam.
//!
//! The retriever and the answer generator only see [`LanguageModel`]; the
//! OpenAI client lives behind the `openai` feature.

#[cfg(feature = "openai")]
pub mod openai;

use async_trait::async_trait;
use crate::Result;

#[cfg(feature = "openai")]
pub use openai::OpenAiChat;

/// A chat model that turns one prompt into one completion.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Send `prompt` as the user message, optionally preceded by a system
    /// instruction, and return the completion text.
    async fn invoke(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
