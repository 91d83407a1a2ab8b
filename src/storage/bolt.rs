//! Neo4j backend over the Bolt protocol (`neo4rs`).
//!
//! Introspection runs three Cypher statements against the live server; raw
//! queries from the retriever are forwarded verbatim. Bolt values are
//! converted into the crate's `Value` at the boundary.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use neo4rs::{query, BoltType, ConfigBuilder, Graph, Row};
use tracing::{debug, info};

use crate::model::*;
use crate::{Error, Result};
use super::{BackendCapabilities, GraphBackend, ProcedureResult, PropertySample, RelationshipPattern};

// ============================================================================
// Introspection queries
// ============================================================================

const NODE_PROPERTIES_QUERY: &str = "\
MATCH (n)
WITH DISTINCT labels(n) AS node_labels, keys(n) AS property_keys, n
UNWIND node_labels AS label
UNWIND property_keys AS key
RETURN label, key, n[key] AS sample_value";

const REL_PROPERTIES_QUERY: &str = "\
MATCH ()-[r]->()
WITH DISTINCT type(r) AS rel_type, keys(r) AS property_keys, r
UNWIND property_keys AS key
RETURN rel_type, key, r[key] AS sample_value";

const REL_PATTERNS_QUERY: &str = "\
MATCH (a)-[r]->(b)
RETURN DISTINCT labels(a) AS start_labels, type(r) AS rel_type, labels(b) AS end_labels";

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for a Neo4j server.
#[derive(Debug, Clone)]
pub struct BoltConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Target database; the server default when `None`.
    pub database: Option<String>,
}

// ============================================================================
// BoltBackend
// ============================================================================

/// A live connection handle to a Neo4j server.
pub struct BoltBackend {
    graph: Graph,
    uri: String,
}

impl BoltBackend {
    /// Connect and verify the server answers.
    ///
    /// `neo4rs` opens its pool lazily, so a `RETURN 1` round trip forces the
    /// handshake; an unreachable server or rejected credentials fail here.
    pub async fn connect(config: &BoltConfig) -> Result<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str());
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo4j_config = builder.build().map_err(connection_error)?;

        let graph = Graph::connect(neo4j_config).await.map_err(connection_error)?;
        graph.run(query("RETURN 1")).await.map_err(connection_error)?;

        info!(uri = %config.uri, "connected to Neo4j");
        Ok(Self { graph, uri: config.uri.clone() })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Run `cypher` and convert each row as it arrives off the stream.
    async fn fetch<T, F>(&self, cypher: &str, mut convert: F) -> Result<Vec<T>>
    where
        T: Send,
        F: FnMut(Row) -> Result<T> + Send,
    {
        let mut stream = self.graph.execute(query(cypher)).await.map_err(execution_error)?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await.map_err(execution_error)? {
            out.push(convert(row)?);
        }
        debug!(rows = out.len(), "fetched rows");
        Ok(out)
    }

    async fn fetch_samples(&self, cypher: &str, owner_column: &str) -> Result<Vec<PropertySample>> {
        self.fetch(cypher, |row| {
            Ok(PropertySample {
                owner: column(&row, owner_column)?,
                key: column(&row, "key")?,
                value: from_bolt(column::<BoltType>(&row, "sample_value")?),
            })
        })
        .await
    }
}

#[async_trait]
impl GraphBackend for BoltBackend {
    /// The pool closes its connections when the handle is dropped.
    async fn shutdown(&self) -> Result<()> {
        info!(uri = %self.uri, "closing Neo4j connection");
        Ok(())
    }

    async fn node_property_samples(&self) -> Result<Vec<PropertySample>> {
        self.fetch_samples(NODE_PROPERTIES_QUERY, "label").await
    }

    async fn relationship_property_samples(&self) -> Result<Vec<PropertySample>> {
        self.fetch_samples(REL_PROPERTIES_QUERY, "rel_type").await
    }

    async fn relationship_patterns(&self) -> Result<Vec<RelationshipPattern>> {
        self.fetch(REL_PATTERNS_QUERY, |row| {
            Ok(RelationshipPattern {
                start_labels: column(&row, "start_labels")?,
                rel_type: column(&row, "rel_type")?,
                end_labels: column(&row, "end_labels")?,
            })
        })
        .await
    }

    async fn execute_raw(&self, cypher: &str) -> Result<ProcedureResult> {
        let mut columns = Vec::new();
        let rows = self
            .fetch(cypher, |row| {
                let record: BTreeMap<String, BoltType> = row
                    .to()
                    .map_err(|e| Error::ExecutionError(format!("cannot decode record: {e}")))?;
                if columns.is_empty() {
                    columns = record.keys().cloned().collect();
                }
                Ok(record
                    .into_iter()
                    .map(|(k, v)| (k, from_bolt(v)))
                    .collect::<HashMap<String, Value>>())
            })
            .await?;
        Ok(ProcedureResult { columns, rows })
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { supports_raw_cypher: true }
    }
}

// ============================================================================
// Bolt → Value
// ============================================================================

fn column<T: serde::de::DeserializeOwned>(row: &Row, name: &str) -> Result<T> {
    row.get(name)
        .map_err(|e| Error::ExecutionError(format!("column '{name}': {e}")))
}

/// Convert a Bolt value into a crate `Value`.
///
/// Temporal values and 2D points map onto their `Value` counterparts
/// (zoned date-times normalized to UTC). Durations, 3D points and paths
/// have none and come through as `Null`.
pub(crate) fn from_bolt(value: BoltType) -> Value {
    match value {
        BoltType::Null(_) => Value::Null,
        BoltType::Boolean(b) => Value::Bool(b.value),
        BoltType::Integer(i) => Value::Int(i.value),
        BoltType::Float(f) => Value::Float(f.value),
        BoltType::String(s) => Value::String(s.value),
        BoltType::Bytes(b) => Value::Bytes(b.value.to_vec()),
        BoltType::List(l) => Value::List(l.value.into_iter().map(from_bolt).collect()),
        BoltType::Map(m) => Value::Map(
            m.value.into_iter().map(|(k, v)| (k.value, from_bolt(v))).collect(),
        ),
        BoltType::Node(n) => Value::Node(Box::new(Node {
            id: NodeId(n.id.value as u64),
            labels: n.labels.value.into_iter().filter_map(label_of).collect(),
            properties: n.properties.value.into_iter().map(|(k, v)| (k.value, from_bolt(v))).collect(),
        })),
        BoltType::Relation(r) => Value::Relationship(Box::new(Relationship {
            id: RelId(r.id.value as u64),
            src: NodeId(r.start_node_id.value as u64),
            dst: NodeId(r.end_node_id.value as u64),
            rel_type: r.typ.value,
            properties: r.properties.value.into_iter().map(|(k, v)| (k.value, from_bolt(v))).collect(),
        })),
        BoltType::Date(d) => temporal(NaiveDate::try_from(&d), Value::Date),
        BoltType::LocalTime(t) => Value::Time(NaiveTime::from(&t)),
        BoltType::Time(t) => Value::Time(<(NaiveTime, FixedOffset)>::from(&t).0),
        BoltType::LocalDateTime(dt) => temporal(NaiveDateTime::try_from(&dt), Value::LocalDateTime),
        BoltType::DateTime(dt) => temporal(DateTime::<FixedOffset>::try_from(&dt), |dt| {
            Value::DateTime(dt.with_timezone(&Utc))
        }),
        BoltType::DateTimeZoneId(dt) => temporal(DateTime::<FixedOffset>::try_from(&dt), |dt| {
            Value::DateTime(dt.with_timezone(&Utc))
        }),
        BoltType::Point2D(p) => Value::Point2D {
            srid: p.sr_id.value as i32,
            x: p.x.value,
            y: p.y.value,
        },
        other => {
            debug!(?other, "bolt value without a crate counterpart");
            Value::Null
        }
    }
}

fn temporal<T>(converted: std::result::Result<T, neo4rs::Error>, wrap: impl FnOnce(T) -> Value) -> Value {
    match converted {
        Ok(v) => wrap(v),
        Err(e) => {
            debug!(error = %e, "temporal value out of range");
            Value::Null
        }
    }
}

fn label_of(value: BoltType) -> Option<String> {
    match value {
        BoltType::String(s) => Some(s.value),
        _ => None,
    }
}

fn connection_error(e: neo4rs::Error) -> Error {
    Error::ConnectionError(e.to_string())
}

fn execution_error(e: neo4rs::Error) -> Error {
    Error::ExecutionError(e.to_string())
}
