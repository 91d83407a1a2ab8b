//! # Graph RAG
//!
//! Question answering over the graph in two model calls:
//!
//! ```text
//! question ──text2cypher prompt──▶ LLM ──▶ Cypher ──execute_raw──▶ records
//! records + question ──answer prompt──▶ LLM ──▶ answer (or nothing)
//! ```
//!
//! The schema text from [`crate::schema::format_schema`] and a fixed set of
//! example queries prime the first call.

pub mod generation;
pub mod prompt;
pub mod retriever;

pub use generation::{answer_or_fallback, GraphRag, RagAnswer, NO_ANSWER_FALLBACK};
pub use prompt::{default_examples, DEFAULT_EXAMPLES};
pub use retriever::{extract_cypher, format_records, RetrieverResult, Text2CypherRetriever};
