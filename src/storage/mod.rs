//! # Graph Backend Trait
//!
//! This is THE contract between graphrag-chat and a graph database.
//! The schema extractor and the text-to-Cypher retriever only ever talk
//! to a `GraphBackend`.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryBackend` | `memory` | In-memory graph for testing/embedding |
//! | `BoltBackend` | `bolt` | External Neo4j via Bolt protocol |

pub mod memory;
#[cfg(feature = "bolt")]
pub mod bolt;

use std::collections::HashMap;

use async_trait::async_trait;
use crate::model::Value;
use crate::{Error, Result};

pub use memory::MemoryBackend;
#[cfg(feature = "bolt")]
pub use bolt::{BoltBackend, BoltConfig};

// ============================================================================
// Introspection rows
// ============================================================================

/// One observed property value, attributed to a node label or a
/// relationship type.
///
/// Nodes yield one sample per (label, key) of every node; a node with
/// labels `[A, B]` and keys `[x, y]` yields four samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySample {
    /// Node label or relationship type.
    pub owner: String,
    pub key: String,
    pub value: Value,
}

impl PropertySample {
    pub fn new(owner: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self { owner: owner.into(), key: key.into(), value }
    }
}

/// A directed relationship shape: labels of both endpoints plus the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipPattern {
    pub start_labels: Vec<String>,
    pub rel_type: String,
    pub end_labels: Vec<String>,
}

impl RelationshipPattern {
    /// First label of the start node; it names the endpoint in `(:Start)`.
    pub fn start_label(&self) -> Option<&str> {
        self.start_labels.first().map(String::as_str)
    }

    /// First label of the end node.
    pub fn end_label(&self) -> Option<&str> {
        self.end_labels.first().map(String::as_str)
    }
}

// ============================================================================
// Backend capabilities
// ============================================================================

/// What a backend can do.
///
/// All fields default to false. Backends override via `capabilities()`.
#[derive(Debug, Clone, Default)]
pub struct BackendCapabilities {
    /// Arbitrary Cypher can be run through `execute_raw()`.
    pub supports_raw_cypher: bool,
}

// ============================================================================
// Raw query result
// ============================================================================

/// Result of a raw Cypher execution.
///
/// `columns` carries the column order; every row maps each column to its
/// value.
#[derive(Debug, Clone, Default)]
pub struct ProcedureResult {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
}

impl ProcedureResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// GraphBackend Trait
// ============================================================================

/// The graph database contract.
///
/// The three scan methods mirror the introspection queries run against a
/// live server; they are the only reads the schema extractor needs.
/// Backends return `Error::ExecutionError("... not supported")` for
/// operations they cannot handle.
#[async_trait]
pub trait GraphBackend: Send + Sync + 'static {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut down the backend, releasing its connections.
    async fn shutdown(&self) -> Result<()>;

    // ========================================================================
    // Schema introspection
    // ========================================================================

    /// One sample per (label, property key) of every node, in scan order.
    async fn node_property_samples(&self) -> Result<Vec<PropertySample>>;

    /// One sample per (type, property key) of every relationship, in scan order.
    async fn relationship_property_samples(&self) -> Result<Vec<PropertySample>>;

    /// Distinct (start labels, type, end labels) shapes of all directed
    /// relationships.
    async fn relationship_patterns(&self) -> Result<Vec<RelationshipPattern>>;

    // ========================================================================
    // Escape hatch
    // ========================================================================

    /// Pass-through for backend-native queries.
    ///
    /// Bolt: forwards the Cypher string to Neo4j.
    /// Memory: not supported.
    async fn execute_raw(&self, _query: &str) -> Result<ProcedureResult> {
        Err(Error::ExecutionError("raw query execution not supported".into()))
    }

    // ========================================================================
    // Capability negotiation
    // ========================================================================

    /// Report what this backend can do.
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }
}
