//! # Property Graph Model
//!
//! Clean DTOs for the Neo4j-compatible property graph. These types cross
//! every boundary: backend ↔ schema extractor ↔ retriever ↔ user.
//!
//! Design rule: NO Bolt types, NO HTTP types here.
//! This module is pure data: no I/O and no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId};
pub use value::Value;
pub use property_map::{PropertyMap, props};
