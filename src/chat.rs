//! Chat session: the one context object a conversation runs through.
//!
//! Created once at startup (which is when the schema is extracted), passed
//! to every turn, and shut down explicitly at the end.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::LanguageModel;
use crate::rag::{answer_or_fallback, GraphRag, RagAnswer, Text2CypherRetriever};
use crate::schema::{extract_schema, format_schema, SchemaDescriptor};
use crate::storage::GraphBackend;
use crate::{Error, Result};

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Connection handle, RAG pipeline and transcript for one conversation.
pub struct ChatSession<B: GraphBackend, L: LanguageModel> {
    backend: Arc<B>,
    rag: GraphRag<B, L>,
    schema: SchemaDescriptor,
    schema_text: String,
    transcript: Vec<ChatMessage>,
}

impl<B: GraphBackend, L: LanguageModel> ChatSession<B, L> {
    /// Extract the schema and wire up the pipeline.
    ///
    /// Fails before touching the graph if the backend cannot run the
    /// generated Cypher.
    pub async fn start(backend: B, llm: L, examples: Vec<String>) -> Result<Self> {
        if !backend.capabilities().supports_raw_cypher {
            return Err(Error::ExecutionError(
                "backend cannot run Cypher queries; a chat session needs one that can".into(),
            ));
        }
        let backend = Arc::new(backend);
        let llm = Arc::new(llm);

        let schema = extract_schema(backend.as_ref()).await?;
        let schema_text = format_schema(&schema);
        if schema.is_empty() {
            warn!("graph is empty; the model will see an empty schema");
        }

        let retriever = Text2CypherRetriever::new(
            Arc::clone(&backend),
            Arc::clone(&llm),
            schema_text.clone(),
            examples,
        );
        let rag = GraphRag::new(retriever, llm);

        Ok(Self { backend, rag, schema, schema_text, transcript: Vec::new() })
    }

    /// Ask one question and record both sides of the turn.
    ///
    /// A missing answer is replaced by the fallback text. On error only the
    /// user line stays in the transcript.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        self.push(Role::User, question);

        let result: Option<RagAnswer> = self.rag.search(question).await?;
        let answer = answer_or_fallback(result.as_ref()).to_string();
        if let Some(rag) = &result {
            info!(cypher = %rag.retrieval.cypher, records = rag.retrieval.items.len(), "answered");
        }

        self.push(Role::Assistant, &answer);
        Ok(answer)
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    /// Release the backend. The session is consumed.
    pub async fn shutdown(self) -> Result<()> {
        info!(turns = self.transcript.len(), "ending chat session");
        self.backend.shutdown().await
    }

    fn push(&mut self, role: Role, text: &str) {
        self.transcript.push(ChatMessage { role, text: text.to_string() });
    }
}
