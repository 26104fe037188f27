//! Structural fingerprints of built values.
//!
//! A fingerprint is the list of dotted key paths reachable in a value. Two
//! values with equal sorted fingerprints have the same shape even if their
//! leaves differ, which is what decides whether a stored fixture is reused.

use indexmap::IndexSet;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Key paths of `value` in discovery order, without duplicates.
///
/// For every object entry the bare key is recorded, then its dotted path
/// from the root. Arrays are sampled through their first element only,
/// descending through nested arrays and appending `[0]` per level, so
/// `{"rows": [[{"id": 1}]]}` yields `rows`, `id`, `rows[0][0].id`. A top-level
/// array is walked entry by entry with the index as key. Scalars at the top
/// level have no key paths.
pub fn key_paths(value: &Value) -> Vec<String> {
    let mut paths = IndexSet::new();
    match value {
        Value::Object(map) => walk_object(map, "", &mut paths),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_entry(&index.to_string(), item, "", &mut paths);
            }
        }
        _ => {}
    }
    paths.into_iter().collect()
}

fn walk_object(map: &Map<String, Value>, parent: &str, paths: &mut IndexSet<String>) {
    for (key, value) in map {
        walk_entry(key, value, parent, paths);
    }
}

fn walk_entry(key: &str, value: &Value, parent: &str, paths: &mut IndexSet<String>) {
    paths.insert(key.to_string());
    let mut chain = if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    };

    let mut current = Some(value);
    while let Some(Value::Array(items)) = current {
        chain.push_str("[0]");
        current = items.first();
    }

    match current {
        Some(Value::Object(map)) => walk_object(map, &chain, paths),
        Some(_) => {
            paths.insert(chain);
        }
        // Empty array: only the bare key is recorded.
        None => {}
    }
}

/// Sorted key paths, the form fingerprints are compared and stored in.
pub fn structure(value: &Value) -> Vec<String> {
    let mut paths = key_paths(value);
    paths.sort();
    paths
}

pub fn is_same_structure(left: &Value, right: &Value) -> bool {
    structure(left) == structure(right)
}

/// Hex SHA-256 of a sorted structure.
pub fn digest(structure: &[String]) -> String {
    let mut hasher = Sha256::new();
    for path in structure {
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
