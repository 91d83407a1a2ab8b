//! # Schema Extraction
//!
//! Samples a live graph and summarizes it as a [`SchemaDescriptor`]: which
//! properties each label and relationship type carries, a coarse type tag
//! for each, and the directed `(:Start)-[:TYPE]->(:End)` shapes.
//!
//! ```text
//! GraphBackend ──scan──▶ PropertySample / RelationshipPattern
//!              ──extract_schema()──▶ SchemaDescriptor
//!              ──format_schema()───▶ prompt text
//! ```
//!
//! ## Sampling rules
//!
//! - The first sample seen for a (label, key) or (type, key) pair decides
//!   its tag; later samples are ignored, even if their type differs.
//! - A node with several labels attributes all of its keys to every one of
//!   its labels. Two node shapes sharing a label therefore merge, and a key
//!   can be attributed to a label that never carries it on its own.
//! - Relationship shapes use only the first label of each endpoint.
//! - Labels and types without properties do not appear in the property
//!   sections.
//!
//! The descriptor is built once and never refreshed; it goes stale if the
//! database schema changes afterwards.

pub mod format;
pub mod types;

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::storage::GraphBackend;
use crate::Result;

pub use format::format_schema;
pub use types::{infer_type, TypeTag};

// ============================================================================
// Ordered property maps
// ============================================================================

/// Property key → type tag, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTypes {
    entries: Vec<(String, TypeTag)>,
}

impl PropertyTypes {
    pub fn get(&self, key: &str) -> Option<&TypeTag> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, tag)| tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeTag)> {
        self.entries.iter().map(|(k, tag)| (k.as_str(), tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Label (or relationship type) → its property types, in first-discovery
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyIndex {
    entries: Vec<(String, PropertyTypes)>,
}

impl PropertyIndex {
    pub fn get(&self, owner: &str) -> Option<&PropertyTypes> {
        self.entries.iter().find(|(o, _)| o == owner).map(|(_, props)| props)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyTypes)> {
        self.entries.iter().map(|(o, props)| (o.as_str(), props))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a tag unless the pair is already known. Returns whether it
    /// was recorded.
    pub fn record(&mut self, owner: &str, key: &str, tag: TypeTag) -> bool {
        self.record_with(owner, key, || tag)
    }

    fn record_with(&mut self, owner: &str, key: &str, tag: impl FnOnce() -> TypeTag) -> bool {
        let props = match self.entries.iter().position(|(o, _)| o == owner) {
            Some(i) => &mut self.entries[i].1,
            None => {
                self.entries.push((owner.to_string(), PropertyTypes::default()));
                let last = self.entries.len() - 1;
                &mut self.entries[last].1
            }
        };
        if props.get(key).is_some() {
            return false;
        }
        props.entries.push((key.to_string(), tag()));
        true
    }
}

// ============================================================================
// SchemaDescriptor
// ============================================================================

/// Sampled summary of the node and relationship shapes in a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub nodes: PropertyIndex,
    pub relationships: PropertyIndex,
    /// `(:Start)-[:TYPE]->(:End)`, deduplicated and sorted by
    /// (start label, type, end label).
    pub relations: Vec<String>,
}

impl SchemaDescriptor {
    /// Tag of a node property, if the label carries it.
    pub fn node_property(&self, label: &str, key: &str) -> Option<&TypeTag> {
        self.nodes.get(label)?.get(key)
    }

    /// Tag of a relationship property, if the type carries it.
    pub fn relationship_property(&self, rel_type: &str, key: &str) -> Option<&TypeTag> {
        self.relationships.get(rel_type)?.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty() && self.relations.is_empty()
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_schema(self))
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Scan the backend and build its schema descriptor.
///
/// An empty database yields an empty descriptor, not an error.
pub async fn extract_schema<B: GraphBackend + ?Sized>(backend: &B) -> Result<SchemaDescriptor> {
    let mut schema = SchemaDescriptor::default();

    for sample in backend.node_property_samples().await? {
        schema.nodes.record_with(&sample.owner, &sample.key, || infer_type(&sample.value));
    }

    for sample in backend.relationship_property_samples().await? {
        schema.relationships.record_with(&sample.owner, &sample.key, || infer_type(&sample.value));
    }

    let mut triples = BTreeSet::new();
    for pattern in backend.relationship_patterns().await? {
        match (pattern.start_label(), pattern.end_label()) {
            (Some(start), Some(end)) => {
                triples.insert((start.to_string(), pattern.rel_type.clone(), end.to_string()));
            }
            _ => debug!(rel_type = %pattern.rel_type, "skipping relationship with an unlabeled endpoint"),
        }
    }
    schema.relations = triples
        .into_iter()
        .map(|(start, rel_type, end)| format!("(:{start})-[:{rel_type}]->(:{end})"))
        .collect();

    info!(
        labels = schema.nodes.len(),
        relationship_types = schema.relationships.len(),
        relations = schema.relations.len(),
        "schema extracted"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{props, PropertyMap, Value};
    use crate::storage::MemoryBackend;

    #[test]
    fn test_record_first_wins() {
        let mut index = PropertyIndex::default();
        assert!(index.record("Drug", "code", TypeTag::Integer));
        assert!(!index.record("Drug", "code", TypeTag::String));
        assert_eq!(index.get("Drug").unwrap().get("code"), Some(&TypeTag::Integer));
        assert_eq!(index.get("Drug").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_sample_decides_type() {
        let db = MemoryBackend::new();
        db.create_node(&["Drug"], props([("code", 200710605)]));
        db.create_node(&["Drug"], props([("code", "A01")]));

        let schema = extract_schema(&db).await.unwrap();
        assert_eq!(schema.node_property("Drug", "code"), Some(&TypeTag::Integer));
    }

    #[tokio::test]
    async fn test_first_relationship_sample_decides_type() {
        let db = MemoryBackend::new();
        let a = db.create_node(&["Person"], PropertyMap::new());
        let b = db.create_node(&["Person"], PropertyMap::new());
        db.create_relationship(a, b, "KNOWS", props([("since", 2020)])).unwrap();
        db.create_relationship(b, a, "KNOWS", props([("since", "long ago")])).unwrap();

        let schema = extract_schema(&db).await.unwrap();
        assert_eq!(schema.relationship_property("KNOWS", "since"), Some(&TypeTag::Integer));
        assert_eq!(schema.relationships.get("KNOWS").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_multi_label_cross_product() {
        let db = MemoryBackend::new();
        db.create_node(&["Person", "Employee"], props([("salary", 10)]));
        db.create_node(&["Person"], props([("name", "Ada")]));

        let schema = extract_schema(&db).await.unwrap();
        assert_eq!(schema.node_property("Person", "salary"), Some(&TypeTag::Integer));
        assert_eq!(schema.node_property("Employee", "salary"), Some(&TypeTag::Integer));
        assert_eq!(schema.node_property("Person", "name"), Some(&TypeTag::String));
        assert_eq!(schema.node_property("Employee", "name"), None);
    }

    #[tokio::test]
    async fn test_propertyless_labels_only_in_relations() {
        let db = MemoryBackend::new();
        let a = db.create_node(&["Drug"], PropertyMap::new());
        let b = db.create_node(&["ATC"], PropertyMap::new());
        db.create_relationship(a, b, "CATEGORIZED_AS", PropertyMap::new()).unwrap();

        let schema = extract_schema(&db).await.unwrap();
        assert!(schema.nodes.is_empty());
        assert!(schema.relationships.is_empty());
        assert_eq!(schema.relations, vec!["(:Drug)-[:CATEGORIZED_AS]->(:ATC)"]);
    }

    #[tokio::test]
    async fn test_relations_use_first_label_and_dedupe() {
        let db = MemoryBackend::new();
        let a = db.create_node(&["Person", "Employee"], PropertyMap::new());
        let b = db.create_node(&["Person"], PropertyMap::new());
        let c = db.create_node(&["Company"], PropertyMap::new());
        db.create_relationship(a, c, "WORKS_AT", PropertyMap::new()).unwrap();
        db.create_relationship(b, c, "WORKS_AT", PropertyMap::new()).unwrap();
        db.create_relationship(b, a, "KNOWS", PropertyMap::new()).unwrap();

        let schema = extract_schema(&db).await.unwrap();
        assert_eq!(
            schema.relations,
            vec![
                "(:Person)-[:KNOWS]->(:Person)",
                "(:Person)-[:WORKS_AT]->(:Company)",
            ]
        );
    }

    #[tokio::test]
    async fn test_unlabeled_endpoint_is_skipped() {
        let db = MemoryBackend::new();
        let a = db.create_node(&[], PropertyMap::new());
        let b = db.create_node(&["Thing"], PropertyMap::new());
        db.create_relationship(a, b, "POINTS_AT", PropertyMap::new()).unwrap();

        let schema = extract_schema(&db).await.unwrap();
        assert!(schema.relations.is_empty());
    }

    #[tokio::test]
    async fn test_relationship_properties() {
        let db = MemoryBackend::new();
        let a = db.create_node(&["Person"], PropertyMap::new());
        let b = db.create_node(&["Person"], PropertyMap::new());
        db.create_relationship(a, b, "KNOWS", props([("since", Value::from(vec![2020, 2021]))])).unwrap();

        let schema = extract_schema(&db).await.unwrap();
        assert_eq!(schema.relationship_property("KNOWS", "since").unwrap().to_string(), "LIST[INTEGER]");
        assert!(!schema.is_empty());
    }
}
