//! # graphrag-chat — Natural-language chat over a Neo4j graph
//!
//! Turns a question into Cypher with a hosted language model, runs it
//! against the graph, and has the model answer from the returned records.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphBackend` is the contract between the pipeline and the database
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Value` cross all boundaries
//! 3. **Schema is pure data**: sampling produces a `SchemaDescriptor`; rendering it is a pure function
//! 4. **Explicit session**: the connection and transcript live in a `ChatSession`, not in globals
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphrag_chat::{MemoryBackend, extract_schema, format_schema, props};
//!
//! # async fn example() -> graphrag_chat::Result<()> {
//! let graph = MemoryBackend::new();
//! let drug = graph.create_node(&["Drug"], props([("code", 200710605)]));
//! let dosage = graph.create_node(&["Dosage"], props([("description", "1 tablet daily")]));
//! graph.create_relationship(drug, dosage, "HAS_DOSAGE", Default::default())?;
//!
//! let schema = extract_schema(&graph).await?;
//! println!("{}", format_schema(&schema));
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | (always) | In-memory graph for testing/embedding |
//! | Bolt | `bolt` | Connect to external Neo4j via Bolt protocol |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod schema;
pub mod llm;
pub mod rag;
pub mod chat;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{Node, NodeId, PropertyMap, RelId, Relationship, Value, props};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{
    BackendCapabilities, GraphBackend, MemoryBackend, ProcedureResult,
    PropertySample, RelationshipPattern,
};
#[cfg(feature = "bolt")]
pub use storage::{BoltBackend, BoltConfig};

// ============================================================================
// Re-exports: Schema
// ============================================================================

pub use schema::{extract_schema, format_schema, infer_type, SchemaDescriptor, TypeTag};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use llm::LanguageModel;
#[cfg(feature = "openai")]
pub use llm::OpenAiChat;
pub use rag::{answer_or_fallback, GraphRag, RagAnswer, Text2CypherRetriever, NO_ANSWER_FALLBACK};
pub use chat::{ChatMessage, ChatSession, Role};
pub use config::Settings;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Language model error: {0}")]
    LlmError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
