use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint;

/// On-disk fixture layout: the built data plus its sorted structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub data: Value,
    pub structure: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl FixtureRecord {
    pub fn new(data: Value) -> Self {
        let structure = fingerprint::structure(&data);
        let digest = Some(fingerprint::digest(&structure));
        Self {
            data,
            structure,
            digest,
        }
    }

    /// Interpret a stored file. Anything not shaped like a record is a raw
    /// fixture written without its structure.
    pub fn from_stored(stored: Value) -> Self {
        if is_record_shape(&stored) {
            if let Ok(record) = serde_json::from_value::<FixtureRecord>(stored.clone()) {
                return record;
            }
        }
        Self::new(stored)
    }

    /// The stored structure, unless its digest shows it was edited by hand.
    pub fn trusted_structure(&self) -> Vec<String> {
        match &self.digest {
            Some(digest) if *digest == fingerprint::digest(&self.structure) => {
                self.structure.clone()
            }
            _ => fingerprint::structure(&self.data),
        }
    }

    pub fn matches(&self, structure: &[String]) -> bool {
        self.trusted_structure() == structure
    }
}

fn is_record_shape(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    map.contains_key("data")
        && map.get("structure").is_some_and(Value::is_array)
        && map
            .keys()
            .all(|key| matches!(key.as_str(), "data" | "structure" | "digest"))
}
