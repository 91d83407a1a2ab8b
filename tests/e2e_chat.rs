//! End-to-end tests for the chat session and the RAG pipeline.
//!
//! The graph is a `MemoryBackend` behind a thin wrapper that answers
//! `execute_raw()` with canned rows; the model is a scripted queue of
//! completions that also records every prompt it was given.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use graphrag_chat::rag::default_examples;
use graphrag_chat::{
    BackendCapabilities, ChatSession, Error, GraphBackend, GraphRag, LanguageModel,
    MemoryBackend, ProcedureResult, PropertyMap, PropertySample, RelationshipPattern, Result,
    Role, Text2CypherRetriever, Value, props, NO_ANSWER_FALLBACK,
};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl ScriptedModel {
    fn new(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
    }

    fn prompts(&self) -> Arc<Mutex<Vec<(String, Option<String>)>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn invoke(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        self.prompts
            .lock()
            .push((prompt.to_string(), system_instruction.map(str::to_string)));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::LlmError("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct CannedGraph {
    inner: MemoryBackend,
    rows: ProcedureResult,
    queries: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl CannedGraph {
    fn new(inner: MemoryBackend, rows: ProcedureResult) -> Self {
        Self {
            inner,
            rows,
            queries: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl GraphBackend for CannedGraph {
    async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.shutdown().await
    }

    async fn node_property_samples(&self) -> Result<Vec<PropertySample>> {
        self.inner.node_property_samples().await
    }

    async fn relationship_property_samples(&self) -> Result<Vec<PropertySample>> {
        self.inner.relationship_property_samples().await
    }

    async fn relationship_patterns(&self) -> Result<Vec<RelationshipPattern>> {
        self.inner.relationship_patterns().await
    }

    async fn execute_raw(&self, query: &str) -> Result<ProcedureResult> {
        self.queries.lock().push(query.to_string());
        Ok(self.rows.clone())
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { supports_raw_cypher: true }
    }
}

fn drug_graph() -> MemoryBackend {
    let graph = MemoryBackend::new();
    let drug = graph.create_node(
        &["Drug"],
        props([("code", Value::Int(200710605)), ("name", Value::from("Amoranic Tablet 625mg"))]),
    );
    let dosage = graph.create_node(&["Dosage"], props([("description", "1 tablet twice daily")]));
    graph.create_relationship(drug, dosage, "HAS_DOSAGE", PropertyMap::new()).unwrap();
    graph
}

fn dosage_rows() -> ProcedureResult {
    let mut row = HashMap::new();
    row.insert("d.description".to_string(), Value::from("1 tablet twice daily"));
    ProcedureResult { columns: vec!["d.description".into()], rows: vec![row] }
}

const DOSAGE_CYPHER: &str =
    "MATCH (:Drug {name: 'Amoranic Tablet 625mg'})-[:HAS_DOSAGE]->(d:Dosage) RETURN d.description";

// ============================================================================
// 1. A full turn
// ============================================================================

#[tokio::test]
async fn test_answer_is_recorded_in_transcript() {
    let graph = CannedGraph::new(drug_graph(), dosage_rows());
    let queries = Arc::clone(&graph.queries);
    let model = ScriptedModel::new([
        Ok(format!("```cypher\n{DOSAGE_CYPHER}\n```")),
        Ok("Take 1 tablet twice daily.".to_string()),
    ]);
    let prompts = model.prompts();

    let mut session = ChatSession::start(graph, model, default_examples()).await.unwrap();
    let answer = session.ask("What is the dosage of Amoranic Tablet 625mg?").await.unwrap();

    assert_eq!(answer, "Take 1 tablet twice daily.");
    assert_eq!(*queries.lock(), vec![DOSAGE_CYPHER.to_string()]);

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[0].text, "What is the dosage of Amoranic Tablet 625mg?");
    assert_eq!(transcript[1].role, Role::Assistant);
    assert_eq!(transcript[1].text, "Take 1 tablet twice daily.");

    let prompts = prompts.lock();
    assert_eq!(prompts.len(), 2);
    // Cypher generation is primed with schema text and example queries.
    let (cypher_prompt, cypher_system) = &prompts[0];
    assert!(cypher_prompt.contains("Drug {code: INTEGER, name: STRING}"));
    assert!(cypher_prompt.contains("(:Drug)-[:HAS_DOSAGE]->(:Dosage)"));
    assert!(cypher_prompt.contains("200710605"));
    assert!(cypher_prompt.contains("What is the dosage of Amoranic Tablet 625mg?"));
    assert!(cypher_system.is_none());
    // Answer generation sees the formatted records.
    let (answer_prompt, answer_system) = &prompts[1];
    assert!(answer_prompt.contains("<Record d.description='1 tablet twice daily'>"));
    assert!(answer_system.is_some());
}

#[tokio::test]
async fn test_schema_extracted_once_at_start() {
    let graph = CannedGraph::new(drug_graph(), ProcedureResult::default());
    let model = ScriptedModel::new([]);

    let session = ChatSession::start(graph, model, default_examples()).await.unwrap();

    assert_eq!(
        session.schema_text(),
        "Node properties:\n\
         Drug {code: INTEGER, name: STRING}\n\
         Dosage {description: STRING}\n\
         Relationship properties:\n\
         The relationships:\n\
         (:Drug)-[:HAS_DOSAGE]->(:Dosage)"
    );
    assert_eq!(session.schema().relations.len(), 1);
    assert!(session.transcript().is_empty());
}

// ============================================================================
// 2. Fallback when the model has no answer
// ============================================================================

#[tokio::test]
async fn test_blank_answer_becomes_fallback() {
    let graph = CannedGraph::new(drug_graph(), ProcedureResult::default());
    let model = ScriptedModel::new([
        Ok("MATCH (d:Drug {code: 1}) RETURN d.name".to_string()),
        Ok("   \n".to_string()),
    ]);

    let mut session = ChatSession::start(graph, model, default_examples()).await.unwrap();
    let answer = session.ask("Which drug has code 1?").await.unwrap();

    assert_eq!(answer, NO_ANSWER_FALLBACK);
    assert_eq!(answer, "No data found.");
    assert_eq!(session.transcript()[1].text, "No data found.");
    assert!(session.transcript().iter().all(|m| !m.text.is_empty()));
}

// ============================================================================
// 3. Failures
// ============================================================================

#[tokio::test]
async fn test_model_error_keeps_only_user_line() {
    let graph = CannedGraph::new(drug_graph(), dosage_rows());
    let model = ScriptedModel::new([Err(Error::LlmError("rate limited".into()))]);

    let mut session = ChatSession::start(graph, model, default_examples()).await.unwrap();
    let err = session.ask("What is the dosage?").await.unwrap_err();

    assert!(matches!(err, Error::LlmError(_)));
    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript()[0].role, Role::User);
}

#[tokio::test]
async fn test_session_refuses_backend_without_cypher() {
    let model = ScriptedModel::new([Ok("MATCH (n) RETURN n".to_string())]);
    let prompts = model.prompts();
    let graph = drug_graph();
    assert!(!graph.capabilities().supports_raw_cypher);

    let Err(err) = ChatSession::start(graph, model, default_examples()).await else {
        panic!("a backend without raw Cypher must not start a session");
    };

    assert!(matches!(err, Error::ExecutionError(_)));
    assert!(err.to_string().contains("cannot run Cypher"));
    assert!(prompts.lock().is_empty());
}

#[tokio::test]
async fn test_session_continues_after_error() {
    let graph = CannedGraph::new(drug_graph(), dosage_rows());
    let model = ScriptedModel::new([
        Err(Error::LlmError("timeout".into())),
        Ok(DOSAGE_CYPHER.to_string()),
        Ok("Take 1 tablet twice daily.".to_string()),
    ]);

    let mut session = ChatSession::start(graph, model, default_examples()).await.unwrap();
    assert!(session.ask("first").await.is_err());
    let answer = session.ask("second").await.unwrap();

    assert_eq!(answer, "Take 1 tablet twice daily.");
    let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
}

// ============================================================================
// 4. Pipeline without a session
// ============================================================================

#[tokio::test]
async fn test_graph_rag_search_returns_retrieval() {
    let backend = Arc::new(CannedGraph::new(MemoryBackend::new(), dosage_rows()));
    let llm = Arc::new(ScriptedModel::new([
        Ok(DOSAGE_CYPHER.to_string()),
        Ok("Twice daily.".to_string()),
    ]));
    let retriever = Text2CypherRetriever::new(backend, Arc::clone(&llm), "", default_examples());
    let rag = GraphRag::new(retriever, llm);

    let result = rag.search("How often?").await.unwrap().unwrap();

    assert_eq!(result.answer, "Twice daily.");
    assert_eq!(result.retrieval.cypher, DOSAGE_CYPHER);
    assert_eq!(result.retrieval.items, vec!["<Record d.description='1 tablet twice daily'>"]);
}

// ============================================================================
// 5. Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_closes_backend() {
    let graph = CannedGraph::new(drug_graph(), ProcedureResult::default());
    let closed = Arc::clone(&graph.closed);
    let model = ScriptedModel::new([]);

    let session = ChatSession::start(graph, model, default_examples()).await.unwrap();
    assert!(!closed.load(Ordering::SeqCst));

    session.shutdown().await.unwrap();
    assert!(closed.load(Ordering::SeqCst));
}
