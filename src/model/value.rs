//! Universal value type matching Neo4j's type system.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{Node, PropertyMap, Relationship};

/// Neo4j-compatible value type.
///
/// Covers what a property or a returned column can hold:
/// - Scalars: Bool, Int, Float, String, Bytes
/// - Containers: List, Map
/// - Graph: Node, Relationship (only as query results, never as properties)
/// - Temporal: Date, Time, DateTime, LocalDateTime
/// - Spatial: Point2D
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(PropertyMap),

    // Graph types
    Node(Box<Node>),
    Relationship(Box<Relationship>),

    // Temporal types
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),

    // Spatial types
    Point2D { srid: i32, x: f64, y: f64 },
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}

// ============================================================================
// Display
// ============================================================================

/// Renders values the way they appear inside a retrieved record, so the
/// answer model sees Cypher-literal syntax (`'text'`, `[1, 2]`, `{k: v}`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Value::Bytes(b) => write!(f, "<bytes[{}]>", b.len()),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => write_map(f, m),
            Value::Node(n) => {
                write!(f, "(")?;
                for label in &n.labels {
                    write!(f, ":{label}")?;
                }
                if !n.properties.is_empty() {
                    write!(f, " ")?;
                    write_map(f, &n.properties)?;
                }
                write!(f, ")")
            }
            Value::Relationship(r) => {
                write!(f, "[:{}", r.rel_type)?;
                if !r.properties.is_empty() {
                    write!(f, " ")?;
                    write_map(f, &r.properties)?;
                }
                write!(f, "]")
            }
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::LocalDateTime(dt) => write!(f, "{dt}"),
            Value::Point2D { x, y, srid } => write!(f, "point({{srid: {srid}, x: {x}, y: {y}}})"),
        }
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &PropertyMap) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{k}: {v}")?;
    }
    write!(f, "}}")
}
