//! Answer generation over retrieved records.

use std::sync::Arc;

use tracing::info;

use crate::llm::LanguageModel;
use crate::storage::GraphBackend;
use crate::Result;
use super::prompt::{answer_prompt, ANSWER_SYSTEM_INSTRUCTION};
use super::retriever::{RetrieverResult, Text2CypherRetriever};

/// Shown in place of an answer when the pipeline produced none.
pub const NO_ANSWER_FALLBACK: &str = "No data found.";

/// A generated answer and the retrieval it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    pub answer: String,
    pub retrieval: RetrieverResult,
}

/// Retrieval followed by generation.
pub struct GraphRag<B: GraphBackend, L: LanguageModel> {
    retriever: Text2CypherRetriever<B, L>,
    llm: Arc<L>,
}

impl<B: GraphBackend, L: LanguageModel> GraphRag<B, L> {
    pub fn new(retriever: Text2CypherRetriever<B, L>, llm: Arc<L>) -> Self {
        Self { retriever, llm }
    }

    pub fn retriever(&self) -> &Text2CypherRetriever<B, L> {
        &self.retriever
    }

    /// `Ok(None)` when the model returns a blank answer.
    pub async fn search(&self, question: &str) -> Result<Option<RagAnswer>> {
        let retrieval = self.retriever.search(question).await?;
        let prompt = answer_prompt(&retrieval.context(), question);
        let answer = self.llm.invoke(&prompt, Some(ANSWER_SYSTEM_INSTRUCTION)).await?;

        let answer = answer.trim();
        if answer.is_empty() {
            info!("model returned no answer");
            return Ok(None);
        }
        Ok(Some(RagAnswer { answer: answer.to_string(), retrieval }))
    }
}

/// The answer text, or the fallback when there is none.
pub fn answer_or_fallback(result: Option<&RagAnswer>) -> &str {
    match result {
        Some(rag) if !rag.answer.trim().is_empty() => &rag.answer,
        _ => NO_ANSWER_FALLBACK,
    }
}
