//! Coarse property type tags inferred from sample values.

use std::fmt;

use crate::model::Value;

/// Type tag shown next to a property key in the schema text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    /// `LIST[inner]` from the first element, bare `LIST` when empty.
    List(Option<Box<TypeTag>>),
    Unknown,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "STRING"),
            TypeTag::Integer => write!(f, "INTEGER"),
            TypeTag::Float => write!(f, "FLOAT"),
            TypeTag::Boolean => write!(f, "BOOLEAN"),
            TypeTag::List(Some(inner)) => write!(f, "LIST[{inner}]"),
            TypeTag::List(None) => write!(f, "LIST"),
            TypeTag::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Infer the type tag of one sample value.
///
/// Booleans are their own `Value` variant, so they can never be read as
/// INTEGER. Only the first element of a list is inspected.
pub fn infer_type(value: &Value) -> TypeTag {
    match value {
        Value::Bool(_) => TypeTag::Boolean,
        Value::String(_) => TypeTag::String,
        Value::Int(_) => TypeTag::Integer,
        Value::Float(_) => TypeTag::Float,
        Value::List(items) => TypeTag::List(items.first().map(|first| Box::new(infer_type(first)))),
        _ => TypeTag::Unknown,
    }
}
