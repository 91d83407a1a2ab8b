//! PropertyMap — the key-value store on nodes and relationships.

use std::collections::BTreeMap;
use super::Value;

/// A map of property names to values.
///
/// Ordered by key so that scans over the same graph always visit
/// properties in the same order.
pub type PropertyMap = BTreeMap<String, Value>;

/// Build a `PropertyMap` from (key, value) pairs.
pub fn props<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
