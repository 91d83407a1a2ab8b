//! In-memory graph backend.
//!
//! This is the reference implementation of `GraphBackend`.
//! It uses ordered maps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No Cypher**: `execute_raw()` is not supported, so the backend can feed
//!   the schema extractor but cannot answer generated queries.
//! - **Single-writer only**: Per-collection locks mean multi-step mutations
//!   are NOT atomic. Safe for single-threaded or read-heavy use only.
//!
//! Scans visit nodes and relationships in creation order, which makes
//! "first sample wins" reproducible across runs.
//!
//! Use this backend for:
//! - Testing schema extraction and formatting without a server
//! - Embedding a small graph in applications that don't need persistence

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::{GraphBackend, PropertySample, RelationshipPattern};

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory property graph storage.
///
/// Cloning is cheap and yields a handle onto the same graph.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<BTreeMap<NodeId, Node>>,
    relationships: RwLock<BTreeMap<RelId, Relationship>>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(BTreeMap::new()),
                relationships: RwLock::new(BTreeMap::new()),
                next_node_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
            }),
        }
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create a node with the given labels and properties.
    pub fn create_node(&self, labels: &[&str], props: PropertyMap) -> NodeId {
        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node {
            id,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: props,
        };
        self.inner.nodes.write().insert(id, node);
        id
    }

    /// Get a node by ID. Returns None if not found.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.inner.nodes.read().get(&id).cloned()
    }

    /// Set a property on a node (upsert).
    pub fn set_node_property(&self, id: NodeId, key: &str, val: Value) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        node.properties.insert(key.to_string(), val);
        Ok(())
    }

    /// Add a label to a node. Labels keep their attachment order.
    pub fn add_label(&self, id: NodeId, label: &str) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        if !node.has_label(label) {
            node.labels.push(label.to_string());
        }
        Ok(())
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    /// Create a relationship between two existing nodes.
    pub fn create_relationship(
        &self,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship {
            id,
            src,
            dst,
            rel_type: rel_type.to_string(),
            properties: props,
        };
        self.inner.relationships.write().insert(id, rel);
        Ok(id)
    }

    /// Get a relationship by ID.
    pub fn get_relationship(&self, id: RelId) -> Option<Relationship> {
        self.inner.relationships.read().get(&id).cloned()
    }

    /// Set a property on a relationship (upsert).
    pub fn set_relationship_property(&self, id: RelId, key: &str, val: Value) -> Result<()> {
        let mut rels = self.inner.relationships.write();
        let rel = rels.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Relationship {id}")))?;
        rel.properties.insert(key.to_string(), val);
        Ok(())
    }

    // ========================================================================
    // Counts
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.relationships.read().len()
    }
}

// ============================================================================
// GraphBackend impl
// ============================================================================

#[async_trait]
impl GraphBackend for MemoryBackend {
    async fn shutdown(&self) -> Result<()> { Ok(()) }

    async fn node_property_samples(&self) -> Result<Vec<PropertySample>> {
        let nodes = self.inner.nodes.read();
        let mut samples = Vec::new();
        for node in nodes.values() {
            // Every label is paired with every key, like UNWIND labels × keys.
            for label in &node.labels {
                for (key, value) in &node.properties {
                    samples.push(PropertySample::new(label.as_str(), key.as_str(), value.clone()));
                }
            }
        }
        Ok(samples)
    }

    async fn relationship_property_samples(&self) -> Result<Vec<PropertySample>> {
        let rels = self.inner.relationships.read();
        Ok(rels
            .values()
            .flat_map(|rel| {
                rel.properties.iter().map(move |(key, value)| {
                    PropertySample::new(rel.rel_type.as_str(), key.as_str(), value.clone())
                })
            })
            .collect())
    }

    async fn relationship_patterns(&self) -> Result<Vec<RelationshipPattern>> {
        let nodes = self.inner.nodes.read();
        let rels = self.inner.relationships.read();

        let mut seen = HashSet::new();
        let mut patterns = Vec::new();
        for rel in rels.values() {
            let labels_of = |id: &NodeId| {
                nodes.get(id).map(|n| n.labels.clone()).unwrap_or_default()
            };
            let pattern = RelationshipPattern {
                start_labels: labels_of(&rel.src),
                rel_type: rel.rel_type.clone(),
                end_labels: labels_of(&rel.dst),
            };
            if seen.insert(pattern.clone()) {
                patterns.push(pattern);
            }
        }
        Ok(patterns)
    }
}

// ============================================================================
// Tests
// ============================================================================
