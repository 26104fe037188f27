use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::errors::FactoryError;
use crate::node::Node;

/// Ordered mapping from field name to [`Node`].
///
/// Fields resolve in insertion order. Cloning a schema copies the map but
/// shares factories, sequences and lazy references with its source.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, Node>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn field(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.fields.insert(key.into(), node.into())
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Schema {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<Value> for Schema {
    type Error = FactoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Schema::from(map)),
            other => Err(FactoryError::InvalidSchema(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K: Into<String>, N: Into<Node>> FromIterator<(K, N)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, node)| (key.into(), node.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Schema {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_insertion_order() {
        let schema = Schema::new()
            .field("zeta", 1)
            .field("alpha", 2)
            .field("mid", 3);
        let keys: Vec<&String> = schema.keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_non_object_json() {
        let result = Schema::try_from(json!([1, 2]));
        assert!(matches!(result, Err(FactoryError::InvalidSchema(_))));
    }
}
